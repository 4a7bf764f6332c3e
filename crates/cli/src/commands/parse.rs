//! `knowroute parse`: Run the response parser offline.
//!
//! Useful for checking how a model's answer would be read without calling
//! the model.

use super::read_input;
use knowroute_router::{HeuristicParser, SelectionResult};

pub fn run(source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let raw = if source == "-" {
        read_input(source)?
    } else {
        source.to_string()
    };

    let parser = HeuristicParser::new();
    let selection = match parser.try_parse(&raw) {
        Ok(id) => SelectionResult::Selected(id),
        Err(reason) => {
            eprintln!("no selection: {reason}");
            SelectionResult::NoSelection
        }
    };

    println!("{}", serde_json::to_string(&selection)?);
    Ok(())
}
