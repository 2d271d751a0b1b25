//! Command-line driver: parse a proof file and check it

use maxixe::{check, parse_proof};
use std::fs;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <proof_file>", args[0]);
        std::process::exit(2);
    }

    let text = match fs::read_to_string(&args[1]) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("{}: {}", args[1], e);
            std::process::exit(2);
        }
    };

    let proof = match parse_proof(&text) {
        Ok(proof) => proof,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    match check(&proof) {
        Ok(()) => println!("ok"),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
