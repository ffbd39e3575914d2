use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::{self, BufWriter, Read, Write};

use sqlpath::{Options, Value, exists, first, matches, output, parse, query};

#[derive(Parser)]
#[command(
    name = "sqlpath",
    about = "sqlpath - SQL/JSON path queries over JSON documents",
    version,
    after_help = "Example:\n\n\t$ echo '{\"x\": 42}' | sqlpath '$.x'\n\t42"
)]
struct Cli {
    /// Path expression, e.g. '$.store.book[0].title'
    path: String,

    /// Input file; defaults to stdin
    file: Option<String>,

    /// Bind $name variables from a JSON object, e.g. '{"min": 3}'
    #[arg(long, value_name = "JSON")]
    vars: Option<String>,

    /// Allow casts that require time zone usage
    #[arg(long)]
    tz: bool,

    /// Suppress soft evaluation errors (they become null / no output)
    #[arg(long)]
    silent: bool,

    /// Print only the first match
    #[arg(long)]
    first: bool,

    /// Print whether the path selects anything at all
    #[arg(long)]
    exists: bool,

    /// Evaluate the path as a single boolean predicate
    #[arg(long = "match")]
    matches: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = parse(&cli.path)?;

    let text = match &cli.file {
        Some(file) => std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };
    let doc: serde_json::Value = serde_json::from_str(&text).context("invalid JSON input")?;
    let doc = Value::from_json(&doc);

    let mut opts = Options::new().with_tz(cli.tz).silent(cli.silent);
    if let Some(vars) = &cli.vars {
        let vars: serde_json::Value = serde_json::from_str(vars).context("invalid --vars JSON")?;
        let Value::Object(pairs) = Value::from_json(&vars) else {
            bail!("--vars must be a JSON object");
        };
        opts = opts.with_vars(pairs);
    }

    let stdout = io::stdout();
    let mut w = BufWriter::new(stdout.lock());

    if cli.exists {
        write_tristate(&mut w, exists(&path, &doc, &opts)?)?;
    } else if cli.matches {
        write_tristate(&mut w, matches(&path, &doc, &opts)?)?;
    } else if cli.first {
        if let Some(v) = first(&path, &doc, &opts)? {
            output::write_value(&mut w, &v)?;
        }
    } else {
        for v in query(&path, &doc, &opts)? {
            output::write_value(&mut w, &v)?;
        }
    }
    w.flush()?;
    Ok(())
}

/// Print a tri-state boolean: true, false, or null for SQL-NULL.
fn write_tristate<W: Write>(w: &mut W, value: Option<bool>) -> io::Result<()> {
    match value {
        Some(b) => writeln!(w, "{b}"),
        None => writeln!(w, "null"),
    }
}
