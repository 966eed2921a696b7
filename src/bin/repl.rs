use clap::Parser;
use d20_roll::{
    AdvantageMode, Aptitude, Binding, Bindings, MarkdownStringifier, RResult, RollConfig,
    RollResult, RollSession, SimpleStringifier, Stringify,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Roll dice formulas read from stdin, one per line
#[derive(Parser, Debug)]
#[command(name = "d20-repl")]
struct Args {
    /// TOML file with roll settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Advantage mode of the check die: normal, adv or dis. Without it, formulas roll as written
    #[arg(long)]
    mode: Option<AdvantageMode>,

    /// Roll a third die on advantage
    #[arg(long)]
    elven_accuracy: bool,

    /// Bind a variable, e.g. `--bind mod=3` or `--bind bonus=1d4`
    #[arg(long = "bind", value_name = "NAME=VALUE", value_parser = parse_binding)]
    bindings: Vec<(String, Binding)>,

    /// JSON file of actor data, referenced by dotted path (`@aptitudes.might.mod`)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Roll every formula as a check of this aptitude
    #[arg(long)]
    aptitude: Option<Aptitude>,

    /// Print breakdowns as Markdown
    #[arg(long)]
    markdown: bool,

    /// Print each result as a line of JSON
    #[arg(long, conflicts_with = "markdown")]
    json: bool,

    /// Random seed for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_binding(s: &str) -> Result<(String, Binding), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {:?}", s))?;
    let name = name.trim().trim_start_matches('@');
    if name.is_empty() {
        return Err(format!("missing variable name in {:?}", s));
    }
    let value = value.parse::<Binding>().unwrap_or_else(|never| match never {});
    Ok((name.to_string(), value))
}

struct Repl {
    bindings: Bindings,
    config: RollConfig,
    mode: Option<AdvantageMode>,
    elven_accuracy: bool,
    aptitude: Option<Aptitude>,
    rng: StdRng,
}

impl Repl {
    fn roll(&mut self, formula: &str) -> RResult<RollResult> {
        let mut session =
            RollSession::new(formula, self.bindings.clone())?.with_config(&self.config)?;
        if let Some(aptitude) = self.aptitude {
            session = session.with_aptitude(aptitude)?;
        }
        if let Some(mode) = self.mode {
            session = session.with_mode(mode, self.elven_accuracy)?;
        }
        Ok(session.evaluate(&mut self.rng))
    }
}

fn prompt(interactive: bool) -> io::Result<()> {
    if interactive {
        print!("> ");
        io::stdout().flush()?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RollConfig::load(path)?,
        None => RollConfig::default(),
    };
    let mut bindings = match &args.data {
        Some(path) => Bindings::from_json(&serde_json::from_str(&fs::read_to_string(path)?)?),
        None => Bindings::new(),
    };
    bindings.extend(args.bindings.iter().cloned());

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut stringifier: Box<dyn Stringify> = if args.markdown {
        Box::new(MarkdownStringifier::new())
    } else {
        Box::new(SimpleStringifier::new())
    };
    let mut repl = Repl {
        mode: args.mode.or(config.default_mode),
        elven_accuracy: args.elven_accuracy || config.elven_accuracy,
        aptitude: args.aptitude,
        bindings,
        config,
        rng,
    };
    tracing::debug!(mode = ?repl.mode, bindings = repl.bindings.len(), "starting repl");

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    prompt(interactive)?;
    for line in stdin.lock().lines() {
        let line = line?;
        let formula = line.trim();
        if !formula.is_empty() {
            match repl.roll(formula) {
                Ok(result) if args.json => println!("{}", serde_json::to_string(&result)?),
                Ok(result) => {
                    if let Some(flavor) = result.flavor() {
                        println!("{}", flavor);
                    }
                    println!("{}", stringifier.stringify(&result));
                }
                Err(why) => eprintln!("Error: {}", why),
            }
        }
        prompt(interactive)?;
    }
    Ok(())
}
