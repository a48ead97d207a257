use std::fmt::Write as _;
use std::time::Duration;

/// Titles listed per podcast in the report before only the count is shown
const MAX_LISTED_TITLES: usize = 5;

/// Newly downloaded episodes of one podcast, in feed order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodcastSummary {
    pub name: String,
    pub new_episodes: Vec<String>,
}

/// A failure that the run continued past
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub podcast: String,
    /// `None` when the whole feed failed
    pub episode: Option<String>,
    pub error: String,
}

/// What a sync run added to the library
///
/// Podcasts appear in the order their first episode was recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    podcasts: Vec<PodcastSummary>,
    failures: Vec<Failure>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a newly downloaded episode to its podcast's entry
    pub fn record(&mut self, podcast: &str, episode_title: &str) {
        match self.podcasts.iter_mut().find(|p| p.name == podcast) {
            Some(entry) => entry.new_episodes.push(episode_title.to_string()),
            None => self.podcasts.push(PodcastSummary {
                name: podcast.to_string(),
                new_episodes: vec![episode_title.to_string()],
            }),
        }
    }

    pub fn record_failure(&mut self, podcast: &str, episode: Option<&str>, error: impl ToString) {
        self.failures.push(Failure {
            podcast: podcast.to_string(),
            episode: episode.map(String::from),
            error: error.to_string(),
        });
    }

    /// Fold another summary into this one, keeping order
    pub fn merge(&mut self, other: RunSummary) {
        for podcast in other.podcasts {
            for title in &podcast.new_episodes {
                self.record(&podcast.name, title);
            }
        }
        self.failures.extend(other.failures);
    }

    pub fn podcasts(&self) -> &[PodcastSummary] {
        &self.podcasts
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// New episode titles recorded for a podcast
    pub fn new_episodes(&self, podcast: &str) -> &[String] {
        self.podcasts
            .iter()
            .find(|p| p.name == podcast)
            .map(|p| p.new_episodes.as_slice())
            .unwrap_or(&[])
    }

    pub fn total_new(&self) -> usize {
        self.podcasts.iter().map(|p| p.new_episodes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.podcasts.is_empty()
    }

    /// Render the end-of-run console report
    pub fn render_report(&self, elapsed: Duration) -> String {
        let mut out = String::from("\nSummary:\n\n");

        for podcast in &self.podcasts {
            let _ = writeln!(out, "Podcast: {}", podcast.name);
            let _ = writeln!(out, "New Episodes: {}", podcast.new_episodes.len());
            if podcast.new_episodes.len() <= MAX_LISTED_TITLES {
                for title in &podcast.new_episodes {
                    let _ = writeln!(out, " - {title}");
                }
            }
        }

        let total_secs = elapsed.as_secs_f64().round() as u64;
        let _ = writeln!(out, "\nTotal New Episodes Downloaded: {}", self.total_new());
        let _ = writeln!(
            out,
            "Total Time: {} minutes and {} seconds",
            total_secs / 60,
            total_secs % 60
        );

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_podcast_and_episode_order() {
        let mut summary = RunSummary::new();
        summary.record("B Show", "b1");
        summary.record("A Show", "a1");
        summary.record("B Show", "b2");

        let names: Vec<_> = summary.podcasts().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["B Show", "A Show"]);
        assert_eq!(summary.new_episodes("B Show"), ["b1", "b2"]);
        assert_eq!(summary.total_new(), 3);
    }

    #[test]
    fn unknown_podcast_has_no_episodes() {
        let summary = RunSummary::new();
        assert!(summary.new_episodes("Nope").is_empty());
        assert!(summary.is_empty());
    }

    #[test]
    fn merge_combines_summaries() {
        let mut first = RunSummary::new();
        first.record("Show", "ep1");

        let mut second = RunSummary::new();
        second.record("Show", "ep2");
        second.record("Other", "x");
        second.record_failure("Other", Some("y"), "boom");

        first.merge(second);

        assert_eq!(first.new_episodes("Show"), ["ep1", "ep2"]);
        assert_eq!(first.new_episodes("Other"), ["x"]);
        assert_eq!(first.failures().len(), 1);
        assert_eq!(first.failures()[0].error, "boom");
    }

    #[test]
    fn report_lists_up_to_five_titles() {
        let mut summary = RunSummary::new();
        for i in 1..=5 {
            summary.record("Short", &format!("s{i}"));
        }
        for i in 1..=6 {
            summary.record("Long", &format!("l{i}"));
        }

        let report = summary.render_report(Duration::from_secs(125));

        assert!(report.contains("Podcast: Short\nNew Episodes: 5\n - s1\n"));
        assert!(report.contains(" - s5\n"));
        assert!(report.contains("Podcast: Long\nNew Episodes: 6\n"));
        assert!(!report.contains(" - l1"));
        assert!(report.contains("Total New Episodes Downloaded: 11"));
        assert!(report.contains("Total Time: 2 minutes and 5 seconds"));
    }

    #[test]
    fn report_rounds_elapsed_seconds() {
        let summary = RunSummary::new();
        let report = summary.render_report(Duration::from_millis(59_600));
        assert!(report.contains("Total Time: 1 minutes and 0 seconds"));
    }
}
