mod json_io;

use std::fs;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Arg, Command};
use hanyu_dict::cedict::{Entry, Line, Parser};
use hanyu_dict::unihan;
use hanyu_dict::DictCompiler;
use rustc_hash::FxHashMap;

use crate::json_io::EntrySerde;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const BLUE: &str = "\x1B[1;34m"; // Bold Blue
    const RESET: &str = "\x1B[0m"; // Reset color

    let matches = Command::new("Dictionary Generator")
        .about(format!(
            "{BLUE}Dict Generator: compiles CC-CEDICT into a binary lookup blob{RESET}"
        ))
        .after_help(
            "Examples:\n\
         \n\
         dict-generate --cedict dicts/cedict.txt.gz --output cedict.bin\n\
         dict-generate --format json --pretty --output entries.json\n\
         \n\
         The generated blob can be loaded with Dict::load().\n",
        )
        .arg(
            Arg::new("cedict")
                .short('c')
                .long("cedict")
                .value_name("file")
                .default_value("dicts/cedict.txt.gz")
                .help("Gzip-compressed CC-CEDICT source file"),
        )
        .arg(
            Arg::new("hsk-dir")
                .long("hsk-dir")
                .value_name("dir")
                .default_value("dicts/hsk")
                .help("Directory holding hsk1.txt..hsk6.txt word lists"),
        )
        .arg(
            Arg::new("unihan")
                .long("unihan")
                .value_name("file")
                .default_value("dicts/Unihan_Readings.txt")
                .help("Unihan readings database for preferred pronunciations"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("format")
                .default_value("bin")
                .value_parser(["bin", "json"])
                .help("Output format: [bin|json]"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .action(clap::ArgAction::SetTrue)
                .help("Pretty-print JSON when --format json"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("filename")
                .help("Write the compiled dictionary to <filename>. If not specified, a default filename is used."),
        )
        .get_matches();

    let cedict_path = Path::new(matches.get_one::<String>("cedict").unwrap());
    if !cedict_path.exists() {
        eprintln!(
            "{BLUE}CC-CEDICT source '{}' not found.{RESET}\n\
         Download cedict_1_0_ts_utf-8_mdbg.txt.gz from MDBG and place it there.",
            cedict_path.display()
        );
        return Ok(()); // Exit silently
    }

    let format = matches.get_one::<String>("format").map(String::as_str);
    let pretty_json = matches.get_flag("pretty"); // default compact if false

    let default_output = match format {
        Some("json") => "entries.json",
        _ => "cedict.bin",
    };
    let output_file = matches
        .get_one::<String>("output")
        .map(|s| s.as_str())
        .unwrap_or(default_output);

    let entries = read_entries(cedict_path)?;
    eprintln!(
        "{BLUE}Parsed {} entries from {}{RESET}",
        entries.len(),
        cedict_path.display()
    );

    match format {
        Some("json") => {
            write_entries_json(&entries, output_file, /* pretty = */ pretty_json)?;
            let style = if pretty_json { "pretty" } else { "compact" };
            eprintln!("{BLUE}Entry list saved as JSON ({style}) at: {output_file}{RESET}");
        }
        _ => {
            let mut compiler = DictCompiler::new();
            let hsk_dir = Path::new(matches.get_one::<String>("hsk-dir").unwrap());
            match load_hsk_levels(hsk_dir)? {
                Some(levels) => compiler.set_hsk_levels(levels),
                None => eprintln!(
                    "{BLUE}HSK directory '{}' not found; compiling ungraded.{RESET}",
                    hsk_dir.display()
                ),
            }
            let unihan_path = Path::new(matches.get_one::<String>("unihan").unwrap());
            if unihan_path.exists() {
                let readings = unihan::mandarin_readings(File::open(unihan_path)?)?;
                compiler.set_preferred_readings(&readings);
            } else {
                eprintln!(
                    "{BLUE}Unihan readings '{}' not found; skipping preferred ordering.{RESET}",
                    unihan_path.display()
                );
            }
            for entry in entries {
                compiler.push_entry(entry)?;
            }
            let meanings = compiler.len();
            let bin = compiler.finish()?;
            write_atomic(Path::new(output_file), &bin)?;
            eprintln!(
                "{BLUE}Dictionary compiled: {meanings} meanings, {} bytes at: {output_file}{RESET}",
                bin.len()
            );
        }
    }

    Ok(())
}

fn read_entries(path: &Path) -> Result<Vec<Entry>, Box<dyn std::error::Error>> {
    let mut parser = Parser::new(File::open(path)?);
    let mut entries = Vec::new();
    while let Some(line) = parser.next_line()? {
        if let Line::Entry(entry) = line {
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn load_hsk_levels(dir: &Path) -> io::Result<Option<FxHashMap<String, u8>>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let mut levels = FxHashMap::default();
    for level in 1..=6u8 {
        let path = dir.join(format!("hsk{level}.txt"));
        if !path.exists() {
            continue;
        }
        for word in fs::read_to_string(path)?.lines() {
            let word = word.trim();
            if !word.is_empty() {
                levels.insert(word.to_owned(), level);
            }
        }
    }
    Ok(Some(levels))
}

/// Writes via a sibling temp file and a rename, so a failed build never
/// leaves a partial artifact at the output path.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

pub fn write_entries_json(
    entries: &[Entry],
    path: impl AsRef<Path>,
    pretty: bool,
) -> io::Result<()> {
    let dto: Vec<EntrySerde> = entries.iter().map(EntrySerde::from).collect();
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut w, &dto).map_err(to_io)?;
    } else {
        serde_json::to_writer(&mut w, &dto).map_err(to_io)?;
        // newline for POSIX-y tools
        w.write_all(b"\n")?;
    }
    w.flush()
}

// Small adapter so we can stay in io::Result
fn to_io<E: std::error::Error + Send + Sync + 'static>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}
