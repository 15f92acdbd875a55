use crate::types::AnalysisConfig;
use eyre::{Result, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};

/// Format of analysis.json (camelCase). Every key is optional and overrides the default.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisFile {
    subgraph_url: Option<String>,
    window_start: Option<i64>,
    window_end: Option<i64>,
    minimum_data_samples_percentage: Option<f64>,
    page_size: Option<u32>,
    top_n: Option<usize>,
    page_concurrency: Option<usize>,
    request_timeout_secs: Option<u64>,
}

impl AnalysisFile {
    fn apply(self, config: &mut AnalysisConfig) {
        if let Some(v) = self.subgraph_url {
            config.subgraph_url = v;
        }
        if let Some(v) = self.window_start {
            config.window_start = v;
        }
        if let Some(v) = self.window_end {
            config.window_end = v;
        }
        if let Some(v) = self.minimum_data_samples_percentage {
            config.minimum_data_samples_percentage = v;
        }
        if let Some(v) = self.page_size {
            config.page_size = v;
        }
        if let Some(v) = self.top_n {
            config.top_n = v;
        }
        if let Some(v) = self.page_concurrency {
            config.page_concurrency = v;
        }
        if self.request_timeout_secs.is_some() {
            config.request_timeout_secs = self.request_timeout_secs;
        }
    }
}

/// Build subgraph URL from The Graph gateway and subgraph ID.
pub fn subgraph_url_from_id(subgraph_id: &str, api_key: &str) -> String {
    format!(
        "https://gateway.thegraph.com/api/{}/subgraphs/id/{}",
        api_key, subgraph_id
    )
}

fn config_path(env_key: &str, default: &str) -> PathBuf {
    std::env::var(env_key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

/// Read overrides from a JSON file. A missing file leaves `config` untouched.
pub fn load_analysis_file(path: &Path, config: &mut AnalysisConfig) -> Result<()> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(eyre::Report::new(e).wrap_err(format!("failed to read {}", path.display())));
        }
    };
    let file: AnalysisFile = serde_json::from_str(&content)
        .wrap_err_with(|| format!("invalid config file {}", path.display()))?;
    file.apply(config);
    Ok(())
}

/// Apply environment overrides. `lookup` returns the value of a variable, if set.
///
/// `SUBGRAPH_URL` wins over `THE_GRAPH_API_KEY` + `SUBGRAPH_ID`.
pub fn apply_env_overrides<F>(config: &mut AnalysisConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("SUBGRAPH_URL").filter(|v| !v.is_empty()) {
        config.subgraph_url = url;
    } else if let (Some(key), Some(id)) = (lookup("THE_GRAPH_API_KEY"), lookup("SUBGRAPH_ID")) {
        if !key.is_empty() && !id.is_empty() {
            config.subgraph_url = subgraph_url_from_id(&id, &key);
        }
    }

    if let Some(v) = lookup("WINDOW_START") {
        config.window_start = v
            .trim()
            .parse()
            .wrap_err_with(|| format!("WINDOW_START is not an epoch timestamp: {}", v))?;
    }
    if let Some(v) = lookup("WINDOW_END") {
        config.window_end = v
            .trim()
            .parse()
            .wrap_err_with(|| format!("WINDOW_END is not an epoch timestamp: {}", v))?;
    }
    Ok(())
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.subgraph_url.is_empty() {
            return Err(eyre::eyre!("subgraph URL is empty"));
        }
        if self.window_end <= self.window_start {
            return Err(eyre::eyre!(
                "window end {} must be after window start {}",
                self.window_end,
                self.window_start
            ));
        }
        if !(0.0..=1.0).contains(&self.minimum_data_samples_percentage) {
            return Err(eyre::eyre!(
                "minimum data samples percentage must be within [0, 1], got {}",
                self.minimum_data_samples_percentage
            ));
        }
        if self.page_size == 0 {
            return Err(eyre::eyre!("page size must be positive"));
        }
        if self.top_n == 0 {
            return Err(eyre::eyre!("top N must be positive"));
        }
        if self.page_concurrency == 0 {
            return Err(eyre::eyre!("page concurrency must be positive"));
        }
        Ok(())
    }
}

/// Defaults, then `analysis.json` (or `ANALYSIS_JSON`), then environment variables.
pub fn load_analysis_config() -> Result<AnalysisConfig> {
    let mut config = AnalysisConfig::default();
    let path = config_path("ANALYSIS_JSON", "analysis.json");
    load_analysis_file(&path, &mut config)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;

    if config.subgraph_url == crate::types::DEFAULT_SUBGRAPH_URL {
        tracing::warn!(
            "Using the hosted-service subgraph URL; set SUBGRAPH_URL or THE_GRAPH_API_KEY and SUBGRAPH_ID to query the gateway"
        );
    }
    Ok(config)
}
