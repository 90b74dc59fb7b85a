use crate::scrank::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
}

/// The configuration of the run, as reported in the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    pub intransitivity: String,
    pub incompleteness: String,
    pub upsampling: String,
    pub seed: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteRowIndex")]
    pub(crate) _first_vote_row_index: Option<JSValue>,
}

impl FileSource {
    pub fn new(provider: &str, file_path: &str) -> FileSource {
        FileSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            _first_vote_row_index: None,
        }
    }

    /// The index of the first line with a vote, starting at 0.
    pub fn first_vote_row_index(&self) -> ScrankResult<usize> {
        if self._first_vote_row_index.is_none() {
            return Ok(0);
        }
        let x = read_js_int(&self._first_vote_row_index)?;
        if x == 0 {
            whatever!("firstVoteRowIndex starts at 1");
        }
        Ok(x as usize - 1)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisCandidate {
    pub name: String,
    pub excluded: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisRules {
    pub methods: Option<Vec<String>>,
    pub intransitivity: Option<String>,
    pub incompleteness: Option<String>,
    pub upsampling: Option<String>,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<JSValue>,
}

impl AnalysisRules {
    pub fn random_seed(&self) -> ScrankResult<Option<u64>> {
        if self.random_seed.is_some() {
            read_js_int(&self.random_seed).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "voteSources")]
    pub vote_sources: Vec<FileSource>,
    pub candidates: Option<Vec<AnalysisCandidate>>,
    #[serde(default)]
    pub rules: AnalysisRules,
}

impl AnalysisConfig {
    /// The declared candidates that are not excluded, if any were declared.
    pub fn candidate_names(&self) -> Option<Vec<String>> {
        self.candidates.as_ref().map(|cands| {
            cands
                .iter()
                .filter(|c| !c.excluded.unwrap_or(false))
                .map(|c| c.name.clone())
                .collect()
        })
    }
}

pub fn read_config(path: &str) -> ScrankResult<AnalysisConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: AnalysisConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> ScrankResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

// Numbers may be written as strings or as numbers in the configuration.
pub fn read_js_int(x: &Option<JSValue>) -> ScrankResult<u64> {
    match x {
        Some(JSValue::Number(n)) => n.as_u64().context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<u64>()
            .ok()
            .context(ParsingJsonNumberSnafu {}),
        _ => Err(ScrankError::ParsingJsonNumber {}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn js_ints() {
        assert_eq!(read_js_int(&Some(json!(42))).unwrap(), 42);
        assert_eq!(read_js_int(&Some(json!(" 7 "))).unwrap(), 7);
        assert!(read_js_int(&Some(json!("x"))).is_err());
        assert!(read_js_int(&Some(json!(-1))).is_err());
        assert!(read_js_int(&None).is_err());
    }

    #[test]
    fn parse_config() {
        let config: AnalysisConfig = serde_json::from_value(json!({
            "outputSettings": { "contestName": "Dogs" },
            "voteSources": [
                { "provider": "pairwise_voters", "filePath": "votes.csv", "firstVoteRowIndex": 2 }
            ],
            "candidates": [ { "name": "rex" }, { "name": "max", "excluded": true } ],
            "rules": { "methods": ["copeland"], "randomSeed": "42" }
        }))
        .unwrap();
        assert_eq!(config.candidate_names(), Some(vec!["rex".to_string()]));
        assert_eq!(config.rules.random_seed().unwrap(), Some(42));
        assert_eq!(config.vote_sources[0].first_vote_row_index().unwrap(), 1);
        assert_eq!(config.rules.intransitivity, None);
    }

    #[test]
    fn rules_are_optional() {
        let config: AnalysisConfig = serde_json::from_value(json!({
            "outputSettings": { "contestName": "Dogs" },
            "voteSources": []
        }))
        .unwrap();
        assert_eq!(config.rules, AnalysisRules::default());
        assert_eq!(config.rules.random_seed().unwrap(), None);
        assert_eq!(config.candidate_names(), None);
    }
}
