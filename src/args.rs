use clap::Parser;

/// This is a program to rank candidates from pairwise votes, directly and through vote induction.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the description of the analysis, in JSON format.
    /// For more information about the file format, read the manual of the social_choice crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the summary of an analysis in JSON format. If provided, scrank will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the analysis will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the votes are read from this file. Setting this option overrides the
    /// vote sources that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default pairwise_voters) The type of the input: pairwise (a,b,outcome) or pairwise_voters (a,b,outcome,voter).
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (list of comma-separated values or not specified) The ranking methods to run: ranked_pairs, copeland, minimax,
    /// win_ratio, win_tie_ratio, borda.
    #[clap(short, long, value_parser, value_delimiter = ',')]
    pub method: Option<Vec<String>>,

    /// (default break_weakest_link) The strategy to remove the cycles in the votes of a voter.
    #[clap(long, value_parser)]
    pub intransitivity: Option<String>,

    /// (default add_edges_by_win_ratio) The strategy to place the candidates a voter did not compare.
    #[clap(long, value_parser)]
    pub incompleteness: Option<String>,

    /// (default none) How the induced orderings are weighted: none, by_vote or by_voter.
    #[clap(long, value_parser)]
    pub upsampling: Option<String>,

    /// (number) The seed for the random strategies. A random seed is used if not provided.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
