/// Identifier for the source that produced a record.
/// Examples: `nemotron_personas_japan`, `in_memory`
pub type SourceId = String;
/// Name of a record field.
/// Examples: `uuid`, `occupation`, `hobbies_and_interests_list`
pub type FieldName = String;
/// Hugging Face dataset identifier.
/// Example: `nvidia/Nemotron-Personas-Japan`
pub type DatasetId = String;
/// Bearer credential used to authenticate against the corpus host.
/// Example: `hf_xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx`
pub type AccessToken = String;
