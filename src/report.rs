use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    /// A response arrived but didn't meet the expectation.
    Unexpected(String),
    /// The call itself failed.
    Errored(String),
    Skipped(String),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Passed)
    }

    fn tag(&self) -> &'static str {
        match self {
            Verdict::Passed => "[PASS]",
            Verdict::Unexpected(_) => "[FAIL]",
            Verdict::Errored(_) => "[ERR ]",
            Verdict::Skipped(_) => "[SKIP]",
        }
    }

    fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Passed => None,
            Verdict::Unexpected(r) | Verdict::Errored(r) | Verdict::Skipped(r) => Some(r),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub number: u8,
    pub name: &'static str,
    pub status: Option<u16>,
    pub verdict: Verdict,
}

impl Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:>2}. {}", self.verdict.tag(), self.number, self.name)?;
        if let Some(status) = self.status {
            write!(f, " ({})", status)?;
        }
        if let Some(reason) = self.verdict.reason() {
            write!(f, ": {}", reason)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct Report {
    pub outcomes: Vec<StepOutcome>,
}

impl Report {
    pub fn push(&mut self, outcome: StepOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn get(&self, number: u8) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|o| o.number == number)
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.verdict.is_pass()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.verdict, Verdict::Skipped(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed() - self.skipped()
    }

    /// Strict runs fail on anything that isn't a pass, skips included.
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.verdict.is_pass())
    }

    pub fn print_summary(&self) {
        for outcome in &self.outcomes {
            println!("{}", outcome);
        }
        println!(
            "{} passed, {} failed, {} skipped",
            self.passed(),
            self.failed(),
            self.skipped()
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn outcome(number: u8, verdict: Verdict) -> StepOutcome {
        StepOutcome {
            number,
            name: "step",
            status: Some(200),
            verdict,
        }
    }

    #[test]
    fn tally() {
        let mut report = Report::default();
        report.push(outcome(1, Verdict::Passed));
        report.push(outcome(2, Verdict::Unexpected("status 500".into())));
        report.push(outcome(3, Verdict::Errored("connection refused".into())));
        report.push(outcome(4, Verdict::Skipped("no user id".into())));

        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.skipped(), 1);
        assert!(!report.all_passed());
        assert_eq!(report.get(3).map(|o| o.number), Some(3));
    }

    #[test]
    fn summary_line() {
        let line = outcome(5, Verdict::Unexpected("expected 201".into())).to_string();
        assert_eq!(line, "[FAIL]  5. step (200): expected 201");
        assert_eq!(outcome(1, Verdict::Passed).to_string(), "[PASS]  1. step (200)");
    }
}
