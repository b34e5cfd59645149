//! Builds the record of a single variable.

use crate::bivariate::SplitPlan;
use crate::classifier::{Classification, classify};
use crate::config::STATISTICS_THRESHOLD;
use crate::error::{Result, StatsError};
use crate::schema::{StudyInfo, VariableDescriptor};
use crate::summary::Summarizer;
use crate::types::{StatisticsTable, VariableRecord};
use indexmap::IndexMap;
use polars::prelude::*;
use tracing::debug;

/// Read-only state shared by every variable of one run.
pub(crate) struct VariableAssembler<'a> {
    pub df: &'a DataFrame,
    pub study: &'a StudyInfo,
    /// Lower-cased schema name.
    pub dataset: String,
    pub summarizer: Summarizer<'a>,
    pub split: Option<SplitPlan>,
}

impl VariableAssembler<'_> {
    /// Compute the record of `descriptor`. `translated` is the matching
    /// descriptor of the second-language schema.
    pub fn record(
        &self,
        descriptor: &VariableDescriptor,
        translated: Option<&VariableDescriptor>,
    ) -> Result<VariableRecord> {
        let classification = classify(descriptor, self.df);
        let series = self.column(descriptor, &classification)?;
        let translated_values = translated.map(|t| t.values.as_slice());
        debug!(
            "{}: classified as {:?}",
            descriptor.name,
            classification.scale()
        );

        let categories = self
            .summarizer
            .frequencies(&classification, series, translated_values)?;
        let statistics = self.statistics(&classification, series)?;

        let bi = match &self.split {
            Some(plan) if !plan.variable.eq_ignore_ascii_case(&descriptor.name) => {
                let breakdown = plan.cross_tabulate(
                    &self.summarizer,
                    &classification,
                    series,
                    translated_values,
                )?;
                Some(IndexMap::from([(plan.variable.clone(), breakdown)]))
            }
            _ => None,
        };

        Ok(VariableRecord {
            study: self.study.study.clone(),
            analysis_unit: self.study.analysis_unit.clone(),
            period: self.study.period.clone(),
            sub_type: self.study.sub_type.clone(),
            boost: self.study.boost.clone(),
            dataset: self.dataset.clone(),
            variable: descriptor.key(),
            name: descriptor.key(),
            name_cs: descriptor.name.clone(),
            label: descriptor.label.clone(),
            scale: classification.scale().short_name().to_string(),
            categories,
            statistics,
            label_de: translated.map(|t| t.label.clone()),
            bi,
        })
    }

    /// Column backing `descriptor`. Unknown variables need none; every other
    /// classification requires the column to exist.
    fn column(
        &self,
        descriptor: &VariableDescriptor,
        classification: &Classification<'_>,
    ) -> Result<Option<&Series>> {
        if matches!(classification, Classification::Unknown) {
            return Ok(None);
        }
        self.df
            .column(&descriptor.name)
            .map(|column| Some(column.as_materialized_series()))
            .map_err(|_| StatsError::ColumnNotFound(descriptor.name.clone()))
    }

    /// The statistics table, withheld for sparse variables. Unknown variables
    /// always carry an empty table.
    fn statistics(
        &self,
        classification: &Classification<'_>,
        series: Option<&Series>,
    ) -> Result<Option<StatisticsTable>> {
        let table = self.summarizer.statistics(classification, series)?;
        if matches!(classification, Classification::Unknown)
            || table.valid_observations > STATISTICS_THRESHOLD
        {
            Ok(Some(table))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CategoryValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn frame() -> DataFrame {
        df![
            "Q1" => [1i64, 2, 1, 2, 1, 1, 2, 1, 1, 2, 1, 2],
            "sex" => [1i64, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2],
            "note" => ["a", "b", "", "c", "a", "b", "a", "d", "e", "f", "g", "h"],
        ]
        .unwrap()
    }

    fn assembler<'a>(df: &'a DataFrame, study: &'a StudyInfo) -> VariableAssembler<'a> {
        VariableAssembler {
            df,
            study,
            dataset: "panel".to_string(),
            summarizer: Summarizer::new(20),
            split: None,
        }
    }

    fn q1() -> VariableDescriptor {
        VariableDescriptor::categorical(
            "Q1",
            "Satisfied?",
            vec![CategoryValue::new(1, "yes"), CategoryValue::new(2, "no")],
        )
    }

    #[test]
    fn test_identification_fields() {
        let df = frame();
        let study = StudyInfo::new("soep-core");
        let record = assembler(&df, &study).record(&q1(), None).unwrap();

        assert_eq!(record.study, "soep-core");
        assert_eq!(record.dataset, "panel");
        assert_eq!(record.variable, "q1");
        assert_eq!(record.name, "q1");
        assert_eq!(record.name_cs, "Q1");
        assert_eq!(record.scale, "cat");
        assert_eq!(record.label_de, None);
        assert!(record.bi.is_none());
        assert!(record.statistics.is_some());
    }

    #[test]
    fn test_statistics_withheld_for_sparse_variables() {
        let df = frame();
        let study = StudyInfo::new("soep-core");
        let descriptor = VariableDescriptor::string("note", "Note");
        let record = assembler(&df, &study).record(&descriptor, None).unwrap();
        // 11 non-blank values
        assert_eq!(record.statistics.map(|t| t.valid_observations), Some(11));

        let sparse = df.head(Some(11));
        let record = assembler(&sparse, &study).record(&descriptor, None).unwrap();
        assert!(record.statistics.is_none());
    }

    #[test]
    fn test_unknown_variable_gets_empty_blocks() {
        let df = frame();
        let study = StudyInfo::new("soep-core");
        let descriptor = VariableDescriptor::new("absent", "Not in data");
        let record = assembler(&df, &study).record(&descriptor, None).unwrap();

        assert_eq!(record.scale, "");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["categories"], json!({}));
        assert_eq!(value["statistics"], json!({}));
    }

    #[test]
    fn test_missing_column_for_declared_scale() {
        let df = frame();
        let study = StudyInfo::new("soep-core");
        let descriptor = VariableDescriptor::numeric("income", "Income");
        let err = assembler(&df, &study).record(&descriptor, None).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_translated_labels() {
        let df = frame();
        let study = StudyInfo::new("soep-core");
        let translated = VariableDescriptor::categorical(
            "Q1",
            "Zufrieden?",
            vec![CategoryValue::new(1, "ja"), CategoryValue::new(2, "nein")],
        );
        let record = assembler(&df, &study)
            .record(&q1(), Some(&translated))
            .unwrap();

        assert_eq!(record.label_de.as_deref(), Some("Zufrieden?"));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["categories"]["labels_de"], json!(["ja", "nein"]));
    }

    #[test]
    fn test_split_skips_split_variable() {
        let df = frame();
        let study = StudyInfo::new("soep-core");
        let sex = VariableDescriptor::categorical(
            "sex",
            "Gender",
            vec![CategoryValue::new(1, "male"), CategoryValue::new(2, "female")],
        );
        let mut assembler = assembler(&df, &study);
        assembler.split = Some(SplitPlan::build(&sex, &df).unwrap());

        let own = assembler.record(&sex, None).unwrap();
        assert!(own.bi.is_none());

        let record = assembler.record(&q1(), None).unwrap();
        let bi = record.bi.unwrap();
        assert_eq!(bi.keys().collect::<Vec<_>>(), vec!["sex"]);
        assert_eq!(bi["sex"].categories.len(), 2);
    }
}
