use chess_dual_eval::{AnalyzerConfig, EvaluationError, PositionAnalyzer, SelectOptions, Strategy};
use clap::{Arg, ArgMatches, Command};
use log::error;
use std::process::ExitCode;

fn cli() -> Command {
    Command::new("analyze")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Engine + tablebase position analysis")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON configuration file")
                .global(true),
        )
        .arg(
            Arg::new("stockfish")
                .long("stockfish")
                .value_name("PATH")
                .help("UCI engine binary (overrides the configuration)")
                .global(true),
        )
        .arg(
            Arg::new("tablebase_url")
                .long("tablebase-url")
                .value_name("URL")
                .help("Tablebase server base URL (overrides the configuration)")
                .global(true),
        )
        .subcommand(
            Command::new("eval")
                .about("Print the dual evaluation of a position as JSON")
                .arg(Arg::new("fen").value_name("FEN").required(true)),
        )
        .subcommand(
            Command::new("mistake")
                .about("Print whether the move between two positions is a critical mistake")
                .arg(Arg::new("fen_before").value_name("FEN_BEFORE").required(true))
                .arg(Arg::new("fen_after").value_name("FEN_AFTER").required(true)),
        )
        .subcommand(
            Command::new("select")
                .about("Select a tablebase move")
                .arg(Arg::new("fen").value_name("FEN").required(true))
                .arg(
                    Arg::new("strategy")
                        .long("strategy")
                        .value_name("STRATEGY")
                        .value_parser(["best", "resistance", "human"])
                        .default_value("best"),
                )
                .arg(
                    Arg::new("strength")
                        .long("strength")
                        .value_name("F")
                        .help("Probability of playing the best move (human strategy)")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("0.8"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("SEED")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> chess_dual_eval::Result<AnalyzerConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => AnalyzerConfig::from_json_file(path)?,
        None => AnalyzerConfig::default(),
    };

    if let Some(path) = matches.get_one::<String>("stockfish") {
        config.engine.path = path.clone();
    }
    if let Some(url) = matches.get_one::<String>("tablebase_url") {
        config.tablebase.base_url = url.clone();
    }

    config.validate()?;
    Ok(config)
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_default()
}

async fn run(matches: ArgMatches) -> chess_dual_eval::Result<()> {
    let Some((name, sub)) = matches.subcommand() else {
        return Err(EvaluationError::Configuration("No subcommand given".to_string()));
    };

    let config = load_config(sub)?;
    let analyzer = PositionAnalyzer::from_config(&config)?;

    match name {
        "eval" => {
            let evaluation = analyzer.get_dual_evaluation(required(sub, "fen")).await;
            println!("{}", serde_json::to_string_pretty(&evaluation)?);
        }
        "mistake" => {
            let is_mistake = analyzer
                .is_critical_mistake(required(sub, "fen_before"), required(sub, "fen_after"))
                .await;
            println!("{}", is_mistake);
        }
        "select" => {
            let strength = sub.get_one::<f64>("strength").copied().unwrap_or(0.8);
            let strategy = match required(sub, "strategy") {
                "resistance" => Strategy::LongestResistance,
                "human" => Strategy::HumanLike { strength },
                _ => Strategy::Best,
            };
            let opts = SelectOptions {
                top_moves: None,
                seed: sub.get_one::<u64>("seed").copied(),
            };

            match analyzer.select_move(required(sub, "fen"), strategy, opts).await {
                Some(candidate) => println!("{}", serde_json::to_string_pretty(&candidate)?),
                None => println!("null"),
            }
        }
        other => {
            return Err(EvaluationError::Configuration(format!(
                "Unknown subcommand {}",
                other
            )))
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(cli().get_matches()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
