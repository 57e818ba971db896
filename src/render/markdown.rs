use std::fmt::Write;

use indexmap::IndexMap;
use serde_json::Value;

use crate::constants::fields;
use crate::constants::markdown::{
    DETAIL_LIMIT, ELLIPSIS, LIST_PREVIEW_ITEMS, MISSING_VALUE, PERSONA_PREVIEW_CHARS,
    PROFESSIONAL_PREVIEW_CHARS, UNKNOWN_SEX_BUCKET,
};
use crate::data::{PersonaRecord, display_value};

/// Age statistics over records with a present, non-zero age.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgeSummary {
    /// Youngest counted age.
    pub min: i64,
    /// Oldest counted age.
    pub max: i64,
    /// Mean of the counted ages.
    pub mean: f64,
}

impl AgeSummary {
    /// Summarize ages; `None` when no record has a usable age.
    ///
    /// Age `0` is treated like a missing age here.
    pub fn from_records(records: &[PersonaRecord]) -> Option<Self> {
        let ages: Vec<i64> = records
            .iter()
            .filter_map(PersonaRecord::age)
            .filter(|age| *age != 0)
            .collect();
        let min = *ages.iter().min()?;
        let max = *ages.iter().max()?;
        let mean = ages.iter().sum::<i64>() as f64 / ages.len() as f64;
        Some(Self { min, max, mean })
    }
}

/// Count of records per sex value, in first-seen order.
pub fn sex_distribution(records: &[PersonaRecord]) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for record in records {
        let bucket = match record.get(fields::SEX) {
            None | Some(Value::Null) => UNKNOWN_SEX_BUCKET.to_string(),
            Some(value) => display_value(value),
        };
        *counts.entry(bucket).or_insert(0) += 1;
    }
    counts
}

/// Render a Markdown report: summary header, then up to ten detail blocks.
pub fn render_markdown(records: &[PersonaRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# ペルソナ抽出結果\n");
    let _ = writeln!(out, "**取得件数**: {}件\n", records.len());

    if !records.is_empty() {
        if let Some(ages) = AgeSummary::from_records(records) {
            let _ = writeln!(
                out,
                "**年齢**: {}歳 〜 {}歳（平均: {:.1}歳）\n",
                ages.min, ages.max, ages.mean
            );
        }
        let distribution = sex_distribution(records)
            .iter()
            .map(|(sex, count)| format!("{sex}: {count}人"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "**性別分布**: {distribution}\n");
    }

    let _ = writeln!(out, "---\n");
    for (position, record) in records.iter().take(DETAIL_LIMIT).enumerate() {
        write_detail(&mut out, position + 1, record);
    }

    if records.len() > DETAIL_LIMIT {
        let _ = writeln!(
            out,
            "\n*（他 {} 件は省略）*",
            records.len() - DETAIL_LIMIT
        );
    }
    out
}

fn write_detail(out: &mut String, ordinal: usize, record: &PersonaRecord) {
    let _ = writeln!(out, "## ペルソナ {ordinal}");
    let _ = writeln!(out, "- **UUID**: `{}`", scalar(record, fields::UUID));
    let _ = writeln!(out, "- **年齢**: {}歳", scalar(record, fields::AGE));
    let _ = writeln!(out, "- **性別**: {}", scalar(record, fields::SEX));
    let _ = writeln!(out, "- **職業**: {}", scalar(record, fields::OCCUPATION));
    let _ = writeln!(out, "- **都道府県**: {}", scalar(record, fields::PREFECTURE));
    let _ = writeln!(out, "- **学歴**: {}", scalar(record, fields::EDUCATION_LEVEL));
    let _ = writeln!(out, "- **婚姻状況**: {}", scalar(record, fields::MARITAL_STATUS));

    if let Some(persona) = non_empty_text(record, fields::PERSONA) {
        let _ = writeln!(
            out,
            "\n**統合ペルソナ**:\n> {}{ELLIPSIS}",
            truncate_chars(persona, PERSONA_PREVIEW_CHARS)
        );
    }
    if let Some(professional) = non_empty_text(record, fields::PROFESSIONAL_PERSONA) {
        let _ = writeln!(
            out,
            "\n**職業ペルソナ**:\n> {}{ELLIPSIS}",
            truncate_chars(professional, PROFESSIONAL_PREVIEW_CHARS)
        );
    }

    let hobbies = list_preview(record, fields::HOBBIES_LIST);
    if !hobbies.is_empty() {
        let _ = writeln!(out, "\n**趣味・興味**: {}", hobbies.join(", "));
    }
    let skills = list_preview(record, fields::SKILLS_LIST);
    if !skills.is_empty() {
        let _ = writeln!(out, "\n**スキル**: {}", skills.join(", "));
    }

    let _ = writeln!(out, "\n---\n");
}

fn scalar(record: &PersonaRecord, name: &str) -> String {
    match record.get(name) {
        None | Some(Value::Null) => MISSING_VALUE.to_string(),
        Some(value) => display_value(value),
    }
}

fn non_empty_text<'a>(record: &'a PersonaRecord, name: &str) -> Option<&'a str> {
    record.str_field(name).filter(|text| !text.is_empty())
}

/// First `max_chars` characters of `text` (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

fn list_preview<'a>(record: &'a PersonaRecord, name: &str) -> Vec<&'a str> {
    record
        .get(name)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .take(LIST_PREVIEW_ITEMS)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn persona(idx: usize, age: i64, sex: &str) -> PersonaRecord {
        PersonaRecord::new()
            .with_field("uuid", format!("uuid-{idx}"))
            .with_field("age", age)
            .with_field("sex", sex)
            .with_field("occupation", "看護師")
            .with_field("prefecture", "東京都")
            .with_field("education_level", "大学卒")
            .with_field("marital_status", "既婚")
    }

    #[test]
    fn twelve_records_show_ten_details_and_an_omission_note() {
        let records: Vec<PersonaRecord> = (0..12).map(|i| persona(i, 30, "女")).collect();
        let out = render_markdown(&records);
        assert_eq!(out.matches("## ペルソナ ").count(), 10);
        assert!(out.contains("## ペルソナ 10\n"));
        assert!(!out.contains("## ペルソナ 11"));
        assert!(out.contains("**取得件数**: 12件"));
        assert!(out.contains("**性別分布**: 女: 12人"));
        assert!(out.trim_end().ends_with("*（他 2 件は省略）*"));
    }

    #[test]
    fn ten_or_fewer_records_have_no_omission_note() {
        let records: Vec<PersonaRecord> = (0..10).map(|i| persona(i, 30, "男")).collect();
        assert!(!render_markdown(&records).contains("省略"));
    }

    #[test]
    fn age_summary_skips_zero_and_missing_ages() {
        let records = vec![
            persona(0, 20, "男"),
            persona(1, 0, "男"),
            persona(2, 35, "女"),
            PersonaRecord::new().with_field("uuid", "no-age"),
        ];
        let summary = AgeSummary::from_records(&records).unwrap();
        assert_eq!(summary.min, 20);
        assert_eq!(summary.max, 35);
        assert!((summary.mean - 27.5).abs() < f64::EPSILON);
        assert!(render_markdown(&records).contains("**年齢**: 20歳 〜 35歳（平均: 27.5歳）"));

        let zero_only = vec![persona(0, 0, "男")];
        assert!(AgeSummary::from_records(&zero_only).is_none());
        let out = render_markdown(&zero_only);
        assert!(!out.lines().any(|line| line.starts_with("**年齢**")));
        assert!(out.contains("- **年齢**: 0歳\n"));
    }

    #[test]
    fn sex_histogram_counts_missing_values_as_unknown_in_first_seen_order() {
        let records = vec![
            persona(0, 30, "女"),
            PersonaRecord::new().with_field("uuid", "x"),
            persona(1, 30, "男"),
            persona(2, 30, "女"),
        ];
        let distribution = sex_distribution(&records);
        assert_eq!(
            distribution.into_iter().collect::<Vec<_>>(),
            vec![
                ("女".to_string(), 2),
                ("不明".to_string(), 1),
                ("男".to_string(), 1)
            ]
        );
    }

    #[test]
    fn missing_scalar_fields_render_as_placeholder() {
        let out = render_markdown(&[PersonaRecord::new()]);
        assert!(out.contains("- **UUID**: `N/A`"));
        assert!(out.contains("- **年齢**: N/A歳"));
        assert!(out.contains("- **婚姻状況**: N/A"));
    }

    #[test]
    fn narratives_are_truncated_by_characters() {
        let long_persona: String = "あ".repeat(350);
        let long_professional: String = "い".repeat(250);
        let record = persona(0, 40, "男")
            .with_field("persona", long_persona)
            .with_field("professional_persona", long_professional);
        let out = render_markdown(&[record]);
        assert!(out.contains(&format!("> {}...\n", "あ".repeat(300))));
        assert!(!out.contains(&"あ".repeat(301)));
        assert!(out.contains(&format!("> {}...\n", "い".repeat(200))));
        assert!(!out.contains(&"い".repeat(201)));
    }

    #[test]
    fn short_narratives_still_get_the_ellipsis_and_empty_ones_are_skipped() {
        let record = persona(0, 40, "男")
            .with_field("persona", "短い紹介")
            .with_field("professional_persona", "");
        let out = render_markdown(&[record]);
        assert!(out.contains("**統合ペルソナ**:\n> 短い紹介..."));
        assert!(!out.contains("**職業ペルソナ**"));
    }

    #[test]
    fn lists_show_at_most_five_entries() {
        let record = persona(0, 40, "男")
            .with_field("hobbies_and_interests_list", json!(["a", "b", "c", "d", "e", "f"]))
            .with_field("skills_and_expertise_list", json!(["調理"]));
        let out = render_markdown(&[record]);
        assert!(out.contains("**趣味・興味**: a, b, c, d, e\n"));
        assert!(out.contains("**スキル**: 調理\n"));

        let empty_lists = persona(1, 40, "男")
            .with_field("hobbies_and_interests_list", json!([]))
            .with_field("skills_and_expertise_list", "[\"undecoded\"]");
        let out = render_markdown(&[empty_lists]);
        assert!(!out.contains("**趣味・興味**"));
        assert!(!out.contains("**スキル**"));
    }

    #[test]
    fn empty_result_has_header_only() {
        let out = render_markdown(&[]);
        assert!(out.starts_with("# ペルソナ抽出結果\n\n**取得件数**: 0件\n"));
        assert!(!out.contains("**性別分布**"));
        assert!(!out.contains("## ペルソナ"));
    }

    #[test]
    fn truncate_chars_respects_multibyte_boundaries() {
        assert_eq!(truncate_chars("東京都港区", 2), "東京");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}
