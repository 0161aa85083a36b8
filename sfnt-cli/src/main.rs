//! Command line access to the `sfnt` crate: dump the decoded tables of a font as JSON, or subset
//! a font to the glyphs needed for some text.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sfnt::{Error, Font, Tag, WRITABLE_TABLES};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the decoded tables as JSON
    Info {
        /// The input font file.
        font: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Keep only the glyphs needed to render the given texts
    Subset {
        /// The input font file.
        font: PathBuf,

        /// Texts whose characters should be kept
        #[arg(short, long = "text", required = true)]
        texts: Vec<String>,

        /// The output font file (.ttf)
        #[arg(short, long)]
        output: PathBuf,

        /// Comma separated list of tables to write
        #[arg(long, value_delimiter = ',')]
        tables: Option<Vec<Tag>>,
    },
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Info { font, pretty } => {
            let mut font = Font::open(font)?;
            let info = font.info()?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            if pretty {
                serde_json::to_writer_pretty(&mut out, info).map_err(io::Error::from)?;
            } else {
                serde_json::to_writer(&mut out, info).map_err(io::Error::from)?;
            }
            writeln!(out)?;
        }
        Command::Subset {
            font,
            texts,
            output,
            tables,
        } => {
            let mut font = Font::open(font)?;
            let num_glyphs = font.info()?.num_glyphs();
            let kept = font.subset(&texts[..])?;
            log::info!("Kept {} of {} glyphs", kept.len(), num_glyphs);

            let tables = tables.unwrap_or_else(|| WRITABLE_TABLES.to_vec());
            for warning in font.write_with(&output, &tables)? {
                eprintln!("warning: {}", warning);
            }
        }
    }

    Ok(())
}
