use crate::{
    document::{Document, Options},
    writer::{INDENT_WIDTH, IndentedWriter},
};
use std::{
    fs::File,
    io::{self, BufReader, BufWriter},
    path::PathBuf,
};

mod document;
mod driver;
mod node;
mod writer;


fn usage<T>(err: &'static str) -> anyhow::Result<T> {
    let exe = std::env::args().next().unwrap_or_default();
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("Usage: {exe} [options] <input.xml>\n");
    println!("Options:");
    println!("    -d, --date: generate date-stamp under title");
    println!("    -t, --toc: generate table of contents");
    println!("    -v, --verbose: increase verbosity (repeatable)\n");
    Err(anyhow::Error::msg(err))
}

fn main() -> anyhow::Result<()> {
    let mut args = pico_args::Arguments::from_env();
    let options = Options {
        date: args.contains(["-d", "--date"]),
        toc: args.contains(["-t", "--toc"]),
    };
    let mut verbosity = 0u8;
    while args.contains(["-v", "--verbose"]) {
        verbosity += 1;
    }
    let _ = args.contains("--");
    let Some(input) = args.opt_free_from_str::<PathBuf>()? else {
        return usage("Missing input file argument");
    };
    if !args.finish().is_empty() {
        return usage("Unknown extra arguments passed");
    }

    let filter = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(filter));

    let mut doc = Document::new(options);
    driver::feed(BufReader::new(File::open(&input)?), &mut doc)?;

    let mut out = IndentedWriter::new(INDENT_WIDTH, BufWriter::new(io::stdout().lock()));
    doc.write(&mut out)?;
    Ok(())
}
