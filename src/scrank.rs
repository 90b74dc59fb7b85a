use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use social_choice::induction::*;
use social_choice::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod config_reader;
mod io_common;
mod io_csv;

use crate::scrank::config_reader::*;
use crate::scrank::io_common::{resolve_path, simplify_file_name};
use crate::scrank::io_csv::read_pairwise_records;

#[derive(Debug, Snafu)]
pub enum ScrankError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive integer in the configuration"))]
    ParsingJsonNumber {},
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Line {lineno}: expected {expected} fields, found {found}"))]
    CsvLineArity {
        lineno: usize,
        expected: usize,
        found: usize,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("{source}"))]
    Voting { source: VotingErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ScrankResult<T> = Result<T, ScrankError>;

/// The options of an analysis, once the configuration and the arguments are merged.
#[derive(Debug, Clone)]
struct AnalysisOptions {
    methods: Vec<RankingMethod>,
    intransitivity: IntransitivityStrategy,
    incompleteness: IncompletenessStrategy,
    settings: InductionSettings,
}

const DEFAULT_INPUT_TYPE: &str = "pairwise_voters";
const DEFAULT_METHODS: [RankingMethod; 1] = [RankingMethod::RankedPairs];
const DEFAULT_INTRANSITIVITY: IntransitivityStrategy = IntransitivityStrategy::BreakWeakestLink;
const DEFAULT_INCOMPLETENESS: IncompletenessStrategy = IncompletenessStrategy::AddEdgesByWinRatio;

fn parse_option<T>(x: &Option<String>, default: T) -> ScrankResult<T>
where
    T: std::str::FromStr<Err = VotingErrors>,
{
    match x {
        Some(s) => s.parse::<T>().context(VotingSnafu {}),
        None => Ok(default),
    }
}

// The arguments take precedence over the rules of the configuration.
fn read_options(rules: &AnalysisRules, args: &Args) -> ScrankResult<AnalysisOptions> {
    let method_names = args.method.clone().or_else(|| rules.methods.clone());
    let methods: Vec<RankingMethod> = match method_names {
        Some(names) => names
            .iter()
            .map(|s| s.parse::<RankingMethod>().context(VotingSnafu {}))
            .collect::<ScrankResult<Vec<RankingMethod>>>()?,
        None => DEFAULT_METHODS.to_vec(),
    };
    if methods.is_empty() {
        whatever!("No ranking method was selected");
    }
    let intransitivity = parse_option(
        &args.intransitivity.clone().or_else(|| rules.intransitivity.clone()),
        DEFAULT_INTRANSITIVITY,
    )?;
    let incompleteness = parse_option(
        &args.incompleteness.clone().or_else(|| rules.incompleteness.clone()),
        DEFAULT_INCOMPLETENESS,
    )?;
    let upsampling = parse_option(
        &args.upsampling.clone().or_else(|| rules.upsampling.clone()),
        InductionSettings::DEFAULT.upsampling,
    )?;
    // The seed is always fixed here so that it can be reported.
    let seed = match args.seed {
        Some(s) => s,
        None => rules
            .random_seed()?
            .unwrap_or_else(InductionRng::entropy_seed),
    };
    Ok(AnalysisOptions {
        methods,
        intransitivity,
        incompleteness,
        settings: InductionSettings {
            upsampling,
            seed: Some(seed),
        },
    })
}

fn ranking_to_json(r: &Ranking<String>) -> JSValue {
    json!(r.slots())
}

fn scores_to_json(scores: &[(String, f64)]) -> JSValue {
    let l: Vec<JSValue> = scores
        .iter()
        .map(|(c, s)| json!({"candidate": c, "score": s}))
        .collect();
    json!(l)
}

fn run_method(
    ballot_box: &PairwiseBallotBox<String>,
    method: RankingMethod,
    intransitivity: &IntransitivityResolver<String>,
    incompleteness: &IncompletenessResolver<String>,
    settings: &InductionSettings,
) -> ScrankResult<JSValue> {
    if method.requires_orderings() {
        // Nothing to compare against: the method only runs on the induced orderings.
        let mut election = Election::new(ballot_box);
        let seed = election.enable_ordering_based_methods(intransitivity, incompleteness, settings);
        let scores = election.scores(method).context(VotingSnafu {})?;
        let ranking = RankingResult::from_scores(scores.clone(), &RankOptions::GROUPED).to_ranking();
        return Ok(json!({
            "method": method.name(),
            "inducedRanking": ranking_to_json(&ranking),
            "scores": scores_to_json(&scores),
            "seed": seed,
        }));
    }
    let cmp = compare_with_induced(ballot_box, method, intransitivity, incompleteness, settings)
        .context(VotingSnafu {})?;
    info!(
        "run_method: {}: pairwise {:?} induced {:?} tau {:?}",
        method,
        cmp.pairwise_ranking.slots(),
        cmp.induced_ranking.slots(),
        cmp.tau
    );
    Ok(json!({
        "method": method.name(),
        "pairwiseRanking": ranking_to_json(&cmp.pairwise_ranking),
        "inducedRanking": ranking_to_json(&cmp.induced_ranking),
        "kendallTau": cmp.tau,
        "seed": cmp.seed,
    }))
}

// The victory graph, the victories locked by ranked pairs, their order and the win ratios.
fn beat_graph_js(ballot_box: &PairwiseBallotBox<String>) -> ScrankResult<JSValue> {
    let victories: Vec<JSValue> = ballot_box
        .victory_graph()
        .weighted_edges()
        .into_iter()
        .map(|(winner, loser, e)| {
            json!({
                "winner": winner,
                "loser": loser,
                "wins": e.wins,
                "losses": e.losses,
                "ties": e.ties,
                "margin": e.margin,
            })
        })
        .collect();
    let election = Election::new(ballot_box);
    let locked: Vec<JSValue> = election
        .ranked_pairs_graph()
        .edges()
        .into_iter()
        .map(|(winner, loser)| json!([winner, loser]))
        .collect();
    let order = election
        .rank(RankingMethod::RankedPairs, &RankOptions::DEFAULT)
        .context(VotingSnafu {})?
        .flatten();
    let mut win_ratios: JSMap<String, JSValue> = JSMap::new();
    for (c, s) in election
        .scores(RankingMethod::WinRatio)
        .context(VotingSnafu {})?
    {
        win_ratios.insert(c, json!(s));
    }
    Ok(json!({
        "victories": victories,
        "lockedVictories": locked,
        "rankedPairsOrder": order,
        "winRatios": win_ratios,
    }))
}

fn build_summary_js(
    config: &AnalysisConfig,
    options: &AnalysisOptions,
    sources: &[(String, FileSource)],
    ballot_box: &PairwiseBallotBox<String>,
    results: Vec<JSValue>,
) -> ScrankResult<JSValue> {
    let c = OutputConfig {
        contest: config.output_settings.contest_name.clone(),
        date: config.output_settings.contest_date.clone(),
        intransitivity: options.intransitivity.to_string(),
        incompleteness: options.incompleteness.to_string(),
        upsampling: options.settings.upsampling.to_string(),
        seed: options.settings.seed.unwrap_or_default().to_string(),
    };
    let source_names: Vec<String> = sources
        .iter()
        .map(|(path, _)| simplify_file_name(path))
        .collect();
    let candidates: Vec<&String> = ballot_box.candidates().iter().collect();
    Ok(json!({
        "config": c,
        "sources": source_names,
        "candidates": candidates,
        "numVotes": ballot_box.votes().len(),
        "numVoters": ballot_box.vote_sets().len(),
        "results": results,
        "beatGraph": beat_graph_js(ballot_box)?,
    }))
}

fn run_config(
    config: &AnalysisConfig,
    sources: &[(String, FileSource)],
    options: &AnalysisOptions,
) -> ScrankResult<JSValue> {
    let mut records: Vec<Vec<String>> = Vec::new();
    for (path, cfs) in sources.iter() {
        records.extend(read_pairwise_records(path, cfs)?);
    }
    let ballot_box =
        PairwiseBallotBox::from_records(&records, config.candidate_names()).context(VotingSnafu {})?;
    info!(
        "run_config: {} votes, {} candidates",
        ballot_box.votes().len(),
        ballot_box.candidates().len()
    );

    let intransitivity = IntransitivityResolverFactory::new(&ballot_box).make(options.intransitivity);
    let incompleteness = IncompletenessResolverFactory::new(&ballot_box).make(options.incompleteness);

    let mut results: Vec<JSValue> = Vec::new();
    for method in options.methods.iter() {
        results.push(run_method(
            &ballot_box,
            *method,
            &intransitivity,
            &incompleteness,
            &options.settings,
        )?);
    }
    build_summary_js(config, options, sources, &ballot_box, results)
}

fn check_reference(summary: &JSValue, reference_path: &str) -> ScrankResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("reference summary: {:?}", summary_ref);
    if summary_ref != *summary {
        let pretty_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        let pretty = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
        warn!("Found differences with the reference summary");
        print_diff(pretty_ref.as_str(), pretty.as_str(), "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

/// Runs an analysis from the command line arguments.
pub fn run_analysis(args: &Args) -> ScrankResult<()> {
    let (config, root): (AnalysisConfig, PathBuf) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            (config, root)
        }
        None => {
            if args.input.is_none() {
                whatever!("No votes to read: pass a configuration file with --config or a vote file with --input");
            }
            let config = AnalysisConfig {
                output_settings: OutputSettings {
                    contest_name: "default".to_string(),
                    output_directory: None,
                    contest_date: None,
                },
                vote_sources: vec![],
                candidates: None,
                rules: AnalysisRules::default(),
            };
            (config, PathBuf::from("."))
        }
    };
    info!("config: {:?}", config);

    // The input of the command line replaces the sources of the configuration.
    let sources: Vec<(String, FileSource)> = match &args.input {
        Some(input) => {
            let provider = args.input_type.as_deref().unwrap_or(DEFAULT_INPUT_TYPE);
            vec![(input.clone(), FileSource::new(provider, input))]
        }
        None => config
            .vote_sources
            .iter()
            .map(|cfs| (resolve_path(&root, &cfs.file_path), cfs.clone()))
            .collect(),
    };
    if sources.is_empty() {
        whatever!("The configuration does not list any vote source");
    }

    let options = read_options(&config.rules, args)?;
    info!("options: {:?}", options);

    let summary = run_config(&config, &sources, &options)?;
    let pretty = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;
    match args.out.as_deref() {
        None | Some("stdout") => println!("{}", pretty),
        Some(path) => fs::write(path, &pretty).context(WritingOutputSnafu { path })?,
    }

    if let Some(reference_path) = &args.reference {
        check_reference(&summary, reference_path)?;
    }
    Ok(())
}
