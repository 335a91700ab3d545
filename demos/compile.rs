//! Example: compiling a word list and querying the packed dictionary.
//!
//! With two arguments, compiles the word list at the first path into a Format B
//! dictionary at the second. Without arguments, compiles a small built-in list and
//! prints a few lookups. Pass `--dot` as the only argument to print the DAWG of the
//! built-in list in GraphViz format.
//!
//! Run with: cargo run --example compile -- words.txt words.bin

use std::env;
use std::process::ExitCode;

use boggle_dawg::dawg::dot::to_dot;
use boggle_dawg::dawg::{
    bogglify_word, build_trie, compile_file, compile_words, minimize, CompileOptions,
    FormatBView,
};

const WORDS: [&str; 9] = [
    "bake", "baked", "baker", "cake", "caked", "fake", "lake", "quest", "qi",
];

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [input, output] => match compile_file(input, output, &CompileOptions::default()) {
            Ok(stats) => {
                println!("{stats:#?}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        },
        [flag] if flag == "--dot" => {
            print!("{}", to_dot(&minimize(&build_trie(WORDS))));
            ExitCode::SUCCESS
        }
        [] => {
            demo();
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("usage: compile [<words.txt> <out.bin> | --dot]");
            ExitCode::FAILURE
        }
    }
}

fn demo() {
    let compiled = match compile_words(WORDS, &CompileOptions::default()) {
        Ok(compiled) => compiled,
        Err(err) => {
            eprintln!("error: {err}");
            return;
        }
    };
    println!("{:?}", compiled.stats);

    let dict = match FormatBView::new(&compiled.bytes) {
        Ok(dict) => dict,
        Err(err) => {
            eprintln!("error: {err}");
            return;
        }
    };

    println!("\nWord lookup:");
    for word in ["bake", "baker", "bakes", "cake", "lake", "make", "quest", "qi"] {
        let found = bogglify_word(word).is_some_and(|w| dict.contains(&w));
        println!("  {word}: {}", if found { "yes" } else { "no" });
    }

    println!("\nPrefix checking:");
    for prefix in ["ba", "cak", "ma", "fak"] {
        let found = prefix
            .bytes()
            .map(|b| b - b'a')
            .try_fold(0, |slot, letter| dict.descend(slot, letter))
            .is_some();
        println!("  {prefix}*: {}", if found { "yes" } else { "no" });
    }
}
