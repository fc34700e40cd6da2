use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal, Read, Write};
use std::path::Path;

use clap::{Arg, Command};
use hanyu_dict::cedict::Syllable;
use hanyu_dict::pinyin::{self, Pinyin};
use hanyu_dict::simplified::Converter;
use hanyu_dict::Dict;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const BLUE: &str = "\x1B[1;34m";
    const RESET: &str = "\x1B[0m";

    let matches = Command::new("Hanyu CLI")
        .about(format!(
            "{BLUE}Hanyu CLI: pinyin annotation and script conversion over a compiled dictionary{RESET}"
        ))
        .arg(
            Arg::new("dict")
                .short('d')
                .long("dict")
                .value_name("file")
                .default_value("cedict.bin")
                .help("Compiled dictionary blob produced by dict-generate"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("mode")
                .value_parser(["pinyin", "simplified", "traditional"])
                .required(true)
                .help("Operation: [pinyin|simplified|traditional]"),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("file")
                .help("Read original text from <file>."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("file")
                .help("Write processed text to <file>."),
        )
        .get_matches();

    let dict_path = matches.get_one::<String>("dict").unwrap();
    if !Path::new(dict_path).exists() {
        eprintln!(
            "{BLUE}Dictionary '{dict_path}' not found.{RESET}\n\
         Generate one with dict-generate first."
        );
        return Ok(());
    }
    let dict = Dict::load(dict_path)?;

    let mode = matches.get_one::<String>("mode").unwrap().as_str();
    let input_file = matches.get_one::<String>("input");
    let output_file = matches.get_one::<String>("output");

    let mut text = String::new();
    match input_file {
        Some(file_name) => {
            BufReader::new(File::open(file_name)?).read_to_string(&mut text)?;
        }
        None => {
            if io::stdin().is_terminal() {
                eprintln!("{BLUE}Input text to process, <ctrl-z> or <ctrl-d> to submit:{RESET}");
            }
            io::stdin().read_to_string(&mut text)?;
        }
    }
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(&text);

    let processed = match mode {
        "pinyin" => annotate(&dict, text),
        "simplified" => {
            let mut converter = Converter::new(&dict);
            converter.set_parallel(true);
            converter.to_simplified(text)
        }
        _ => {
            let mut converter = Converter::new(&dict);
            converter.set_parallel(true);
            converter.to_traditional(text)
        }
    };

    let mut output = BufWriter::new(match output_file {
        Some(file_name) => Box::new(File::create(file_name)?) as Box<dyn Write>,
        None => Box::new(io::stdout()) as Box<dyn Write>,
    });
    output.write_all(processed.as_bytes())?;
    if output_file.is_none() && !processed.ends_with('\n') {
        output.write_all(b"\n")?;
    }
    output.flush()?;

    if let Some(output_file) = output_file {
        eprintln!(
            "{BLUE}Processing completed ({mode}): {} -> {output_file}{RESET}",
            input_file.map(String::as_str).unwrap_or("<stdin>"),
        );
    }

    Ok(())
}

/// Annotates Chinese text with pinyin, one token per dictionary word.
///
/// Words with a single meaning render bare; ambiguous words list every
/// reading in dictionary order, preferred first, as `[dú|dòu]`. Characters
/// the dictionary does not know pass through as their own token.
fn annotate(dict: &Dict, text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut at = 0;
    while at < chars.len() {
        let (consumed, meanings) = dict.lookup(&chars[at..]);
        if consumed == 0 {
            let c = chars[at];
            if !c.is_whitespace() {
                tokens.push(c.to_string());
            }
            at += 1;
            continue;
        }
        let mut readings: Vec<String> = meanings
            .iter()
            .map(|m| render_reading(&m.pinyin))
            .collect();
        // Variant spellings repeat a reading back to back.
        readings.dedup();
        if readings.len() == 1 {
            tokens.push(readings.into_iter().next().unwrap_or_default());
        } else {
            tokens.push(format!("[{}]", readings.join("|")));
        }
        at += consumed;
    }
    tokens.join(" ")
}

fn render_reading(syllables: &[Syllable]) -> String {
    let packed: Option<Vec<Pinyin>> = syllables
        .iter()
        .map(|s| match s {
            Syllable::Packed(p) => Some(*p),
            Syllable::Literal(_) => None,
        })
        .collect();
    match packed {
        Some(packed) => pinyin::render_many(&packed),
        None => syllables.iter().map(ToString::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanyu_dict::cedict::Entry;
    use hanyu_dict::DictCompiler;

    fn entry(traditional: &str, simplified: &str, pinyin: &str, glosses: &[&str]) -> Entry {
        Entry {
            traditional: traditional.to_owned(),
            simplified: simplified.to_owned(),
            pinyin: pinyin
                .split_whitespace()
                .map(|token| {
                    let chars: Vec<char> = token.chars().collect();
                    match pinyin::parse(&chars) {
                        Some((p, rest)) if rest.is_empty() => Syllable::Packed(p),
                        _ => Syllable::Literal(token.to_owned()),
                    }
                })
                .collect(),
            glosses: glosses.iter().map(|g| (*g).to_owned()).collect(),
        }
    }

    fn mini_dict() -> Dict {
        let mut compiler = DictCompiler::new();
        for e in [
            entry("你好", "你好", "ni3 hao3", &["hello"]),
            entry("讀", "读", "du2", &["to read"]),
            entry("讀", "读", "dou4", &["comma pause"]),
        ] {
            compiler.push_entry(e).unwrap();
        }
        Dict::from_bytes(compiler.finish().unwrap()).unwrap()
    }

    #[test]
    fn annotates_words_and_passes_unknown_text_through() {
        let dict = mini_dict();
        assert_eq!(annotate(&dict, "你好吗"), "nǐhǎo 吗");
        assert_eq!(annotate(&dict, "读 你好"), "[dú|dòu] nǐhǎo");
        assert_eq!(annotate(&dict, ""), "");
    }

    #[test]
    fn duplicate_readings_collapse() {
        let mut compiler = DictCompiler::new();
        compiler
            .push_entry(entry("妳", "你", "ni3", &["you (female)"]))
            .unwrap();
        compiler
            .push_entry(entry("你", "你", "ni3", &["you"]))
            .unwrap();
        let dict = Dict::from_bytes(compiler.finish().unwrap()).unwrap();
        assert_eq!(annotate(&dict, "你"), "nǐ");
    }
}
