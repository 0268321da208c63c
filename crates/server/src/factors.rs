//! Human-readable reasons attached to a prediction.

use pipeline::FeatureRecord;

const STRONG_TRACK_RECORD: f64 = 0.7;
const HIGH_BUDGET: f64 = 100_000_000.0;
const LOW_BUDGET: f64 = 20_000_000.0;
const HIGH_RATING: f64 = 7.5;
const POPULAR_GENRES: [&str; 3] = ["Action", "Adventure", "Comedy"];

/// Threshold checks on the assembled features, in a fixed order.
///
/// Never empty.
pub fn key_factors(record: &FeatureRecord) -> Vec<String> {
    let mut factors = Vec::new();

    if record.director_success_rate > STRONG_TRACK_RECORD {
        factors.push(format!(
            "Strong director track record ({:.1}%)",
            record.director_success_rate * 100.0
        ));
    }
    if record.actor1_success_rate > STRONG_TRACK_RECORD {
        factors.push(format!(
            "Lead actor success rate ({:.1}%)",
            record.actor1_success_rate * 100.0
        ));
    }
    if record.budget > HIGH_BUDGET {
        factors.push("High production budget".to_string());
    } else if record.budget < LOW_BUDGET {
        factors.push("Low budget risk".to_string());
    }
    if record.avg_rating > HIGH_RATING {
        factors.push(format!("High audience rating ({:.1}/10)", record.avg_rating));
    }
    if POPULAR_GENRES.contains(&record.genres.as_str()) {
        factors.push("Popular genre".to_string());
    }

    if factors.is_empty() {
        factors.push("Standard market conditions".to_string());
    }
    factors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral() -> FeatureRecord {
        FeatureRecord {
            budget: 50_000_000.0,
            runtime: 120.0,
            release_year: 2024,
            release_month: 6,
            avg_rating: 7.0,
            ratings_count: 1000,
            director_success_rate: 0.5,
            actor1_success_rate: 0.5,
            actor2_success_rate: 0.5,
            actor3_success_rate: 0.5,
            genres: "Drama".to_string(),
            original_language: "en".to_string(),
            production_companies: "Independent".to_string(),
        }
    }

    #[test]
    fn test_no_signal_gives_standard_conditions() {
        assert_eq!(key_factors(&neutral()), vec!["Standard market conditions"]);
    }

    #[test]
    fn test_all_factors_in_order() {
        let record = FeatureRecord {
            director_success_rate: 0.85,
            actor1_success_rate: 0.8,
            budget: 150_000_000.0,
            avg_rating: 8.2,
            genres: "Action".to_string(),
            ..neutral()
        };

        assert_eq!(
            key_factors(&record),
            vec![
                "Strong director track record (85.0%)",
                "Lead actor success rate (80.0%)",
                "High production budget",
                "High audience rating (8.2/10)",
                "Popular genre",
            ]
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        let record = FeatureRecord {
            director_success_rate: 0.7,
            budget: 100_000_000.0,
            avg_rating: 7.5,
            ..neutral()
        };

        assert_eq!(key_factors(&record), vec!["Standard market conditions"]);
    }

    #[test]
    fn test_low_budget_and_genre_match_is_exact() {
        let record = FeatureRecord {
            budget: 0.0,
            genres: "Action|Thriller".to_string(),
            ..neutral()
        };

        assert_eq!(key_factors(&record), vec!["Low budget risk"]);
    }
}
