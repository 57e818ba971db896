use crate::constants::corpus::TOKEN_ENV_VAR;
use crate::constants::pipeline::{DEFAULT_SAMPLE_SIZE, DEFAULT_SEED};
use crate::errors::PersonaError;
use crate::filter::FilterCriteria;
use crate::projection::FieldSelection;
use crate::render::OutputFormat;
use crate::types::AccessToken;

/// Settings consumed by the pipeline controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Criteria every accepted record satisfies.
    pub criteria: FilterCriteria,
    /// Fields kept on accepted records.
    pub fields: FieldSelection,
    /// Maximum number of accepted records.
    pub sample_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            fields: FieldSelection::all(),
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

/// Complete, validated configuration for one fetch run.
///
/// Built once at startup; nothing downstream reads the environment.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Filter, projection, and cap settings.
    pub pipeline: PipelineConfig,
    /// Seed controlling the source reorder.
    pub seed: u64,
    /// Renderer used for the final output.
    pub format: OutputFormat,
    /// Pretty-print JSON output.
    pub pretty: bool,
    /// Credential for the corpus host.
    pub token: AccessToken,
}

impl RunConfig {
    /// Validate settings and resolve the credential.
    ///
    /// `env_token` is the value of the fallback environment variable, read
    /// by the caller exactly once.
    pub fn build(
        pipeline: PipelineConfig,
        seed: u64,
        format: OutputFormat,
        pretty: bool,
        explicit_token: Option<String>,
        env_token: Option<String>,
    ) -> Result<Self, PersonaError> {
        if pipeline.sample_size == 0 {
            return Err(PersonaError::InvalidArgument(
                "sample size must be greater than zero".to_string(),
            ));
        }
        pipeline.criteria.validate()?;
        let token = resolve_token(explicit_token, env_token)?;
        Ok(Self {
            pipeline,
            seed,
            format,
            pretty,
            token,
        })
    }
}

/// Pick the credential: explicit value, then environment, else fail.
///
/// Blank values count as absent.
pub fn resolve_token(
    explicit: Option<String>,
    env_value: Option<String>,
) -> Result<AccessToken, PersonaError> {
    explicit
        .filter(|value| !value.trim().is_empty())
        .or_else(|| env_value.filter(|value| !value.trim().is_empty()))
        .map(|value| value.trim().to_string())
        .ok_or(PersonaError::MissingCredential {
            env_var: TOKEN_ENV_VAR,
        })
}

/// Read the credential fallback variable from the process environment.
pub fn env_token() -> Option<String> {
    std::env::var(TOKEN_ENV_VAR).ok()
}

/// Default reorder seed.
pub const fn default_seed() -> u64 {
    DEFAULT_SEED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_token_wins_over_environment() {
        let token = resolve_token(Some("hf_cli".into()), Some("hf_env".into())).unwrap();
        assert_eq!(token, "hf_cli");
    }

    #[test]
    fn environment_token_is_the_fallback() {
        let token = resolve_token(None, Some("hf_env".into())).unwrap();
        assert_eq!(token, "hf_env");
        let blank_explicit = resolve_token(Some("  ".into()), Some("hf_env".into())).unwrap();
        assert_eq!(blank_explicit, "hf_env");
    }

    #[test]
    fn missing_token_is_a_configuration_error() {
        let err = resolve_token(None, None).unwrap_err();
        assert!(matches!(err, PersonaError::MissingCredential { env_var: "HF_TOKEN" }));
        assert!(err.to_string().contains("--token"));
        assert!(resolve_token(Some(String::new()), Some(" ".into())).is_err());
    }

    #[test]
    fn build_rejects_zero_sample_before_credentials() {
        let pipeline = PipelineConfig {
            sample_size: 0,
            ..PipelineConfig::default()
        };
        let err = RunConfig::build(pipeline, 42, OutputFormat::Json, false, None, None).unwrap_err();
        assert!(matches!(err, PersonaError::InvalidArgument(_)));
    }

    #[test]
    fn build_validates_criteria() {
        let pipeline = PipelineConfig {
            criteria: FilterCriteria::new().with_sex("x"),
            ..PipelineConfig::default()
        };
        let err = RunConfig::build(
            pipeline,
            42,
            OutputFormat::Json,
            false,
            Some("hf_tok".into()),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PersonaError::InvalidArgument(_)));
    }

    #[test]
    fn build_keeps_defaults() {
        let config = RunConfig::build(
            PipelineConfig::default(),
            default_seed(),
            OutputFormat::Markdown,
            true,
            None,
            Some("hf_env".into()),
        )
        .unwrap();
        assert_eq!(config.pipeline.sample_size, 100);
        assert_eq!(config.seed, 42);
        assert_eq!(config.token, "hf_env");
        assert_eq!(config.format, OutputFormat::Markdown);
    }
}
