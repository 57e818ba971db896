/// Constants identifying the remote persona corpus.
pub mod corpus {
    /// Hugging Face dataset id of the persona corpus.
    pub const DATASET_ID: &str = "nvidia/Nemotron-Personas-Japan";
    /// Dataset config name.
    pub const DATASET_CONFIG: &str = "default";
    /// Split streamed by the fetch pipeline.
    pub const DATASET_SPLIT: &str = "train";
    /// Source id attached to log lines and errors for the remote corpus.
    pub const SOURCE_ID: &str = "nemotron_personas_japan";
    /// Environment variable consulted when no explicit token is given.
    pub const TOKEN_ENV_VAR: &str = "HF_TOKEN";
}

/// Constants used by the datasets-server row source.
pub mod source {
    /// Rows endpoint of the Hugging Face datasets-server API.
    pub const ROWS_ENDPOINT: &str = "https://datasets-server.huggingface.co/rows";
    /// Rows requested per page (the endpoint caps `length` at 100).
    pub const ROWS_PAGE_LENGTH: usize = 100;
    /// Records held by the seeded shuffle buffer.
    pub const SHUFFLE_BUFFER_CAPACITY: usize = 1_000;
    /// Offset mixed into the run seed before permuting page order.
    pub const PAGE_SEED_OFFSET: u64 = 0x5EED_9A6E;
}

/// Canonical record field names consumed by the pipeline.
pub mod fields {
    /// Stable record identifier.
    pub const UUID: &str = "uuid";
    /// Integer age in years.
    pub const AGE: &str = "age";
    /// Sex, stored as `男` or `女`.
    pub const SEX: &str = "sex";
    /// Occupation title.
    pub const OCCUPATION: &str = "occupation";
    /// Prefecture of residence.
    pub const PREFECTURE: &str = "prefecture";
    /// Region grouping of prefectures.
    pub const REGION: &str = "region";
    /// Highest education level.
    pub const EDUCATION_LEVEL: &str = "education_level";
    /// Marital status.
    pub const MARITAL_STATUS: &str = "marital_status";
    /// Combined narrative persona.
    pub const PERSONA: &str = "persona";
    /// Work-focused narrative persona.
    pub const PROFESSIONAL_PERSONA: &str = "professional_persona";
    /// Hobbies and interests, as an encoded list.
    pub const HOBBIES_LIST: &str = "hobbies_and_interests_list";
    /// Skills and expertise, as an encoded list.
    pub const SKILLS_LIST: &str = "skills_and_expertise_list";
    /// Fields stored as text-encoded JSON arrays.
    pub const LIST_FIELDS: [&str; 2] = [HOBBIES_LIST, SKILLS_LIST];
}

/// Canonical sex tokens stored in the corpus.
pub mod sex {
    /// Stored token for male.
    pub const MALE: &str = "男";
    /// Stored token for female.
    pub const FEMALE: &str = "女";
}

/// Constants used by the pipeline controller.
pub mod pipeline {
    /// Default cap on accepted records.
    pub const DEFAULT_SAMPLE_SIZE: usize = 100;
    /// Default reorder seed.
    pub const DEFAULT_SEED: u64 = 42;
    /// Interval between progress log lines while the pull loop runs.
    pub const PROGRESS_REPORT_MILLIS: u64 = 750;
}

/// Constants used by the Markdown report.
pub mod markdown {
    /// Records rendered as detail blocks; the rest are only counted.
    pub const DETAIL_LIMIT: usize = 10;
    /// Characters of `persona` shown in a detail block.
    pub const PERSONA_PREVIEW_CHARS: usize = 300;
    /// Characters of `professional_persona` shown in a detail block.
    pub const PROFESSIONAL_PREVIEW_CHARS: usize = 200;
    /// List entries shown for hobbies and skills.
    pub const LIST_PREVIEW_ITEMS: usize = 5;
    /// Histogram bucket for records without a sex value.
    pub const UNKNOWN_SEX_BUCKET: &str = "不明";
    /// Placeholder for missing scalar fields.
    pub const MISSING_VALUE: &str = "N/A";
    /// Suffix appended to truncated narrative fields.
    pub const ELLIPSIS: &str = "...";
}
