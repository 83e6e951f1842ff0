use crate::prelude::SampleSequence;
use serde::Serialize;

/// Counts and extremes over the valid part of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SequenceSummary {
    pub valid: usize,
    pub invalid: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean, or `None` for an empty input.
    pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
        let (sum, count) = values
            .into_iter()
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    pub fn summarize(sequence: &SampleSequence) -> SequenceSummary {
        let mut summary = SequenceSummary::default();
        let mut sum = 0.0;
        for sample in sequence.iter() {
            match sample.value() {
                Some(value) => {
                    summary.valid += 1;
                    sum += value;
                    summary.min = Some(summary.min.map_or(value, |m| m.min(value)));
                    summary.max = Some(summary.max.map_or(value, |m| m.max(value)));
                }
                None => summary.invalid += 1,
            }
        }
        if summary.valid > 0 {
            summary.mean = Some(sum / summary.valid as f64);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Sample;

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(StatsHelper::mean(Vec::<f64>::new()), None);
        assert_eq!(StatsHelper::mean([2.0, 4.0]), Some(3.0));
    }

    #[test]
    fn summary_skips_invalid_samples() {
        let seq = SampleSequence::new(
            60,
            vec![Sample::Valid(3.0), Sample::Invalid, Sample::Valid(1.0)],
        );
        let summary = StatsHelper::summarize(&seq);
        assert_eq!(summary.valid, 2);
        assert_eq!(summary.invalid, 1);
        assert_eq!(summary.mean, Some(2.0));
        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.max, Some(3.0));
    }

    #[test]
    fn summary_of_invalid_sequence_has_no_mean() {
        let summary = StatsHelper::summarize(&SampleSequence::invalid(30, 4));
        assert_eq!(summary.invalid, 4);
        assert_eq!(summary.mean, None);
    }
}
