// Interactive console prompts: pure parsers plus an ask-until-valid loop.
//
// Every parser maps one line of user input to a value or an `InputError`.
// `Prompter::ask` prints the error and asks again; end of input aborts.

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

use strikerate_core::analysis::filter::{FilterKind, Venue, YearRange};
use strikerate_core::analysis::metrics::Metric;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("nothing entered")]
    Empty,

    #[error("`{0}` is not a number")]
    NotANumber(String),

    #[error("choice {value} is out of range ({min} to {max})")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("please enter 'yes' or 'no'")]
    NotYesNo,

    #[error("start year {start} is after end year {end}")]
    ReversedYears { start: i32, end: i32 },

    #[error("`{0}` is not in the list")]
    NotListed(String),

    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed before a valid answer was given")]
    EndOfInput,

    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// Parse a whole number (surrounding whitespace allowed).
pub fn parse_number(input: &str) -> Result<i64, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }
    trimmed
        .parse()
        .map_err(|_| InputError::NotANumber(trimmed.to_string()))
}

/// Parse a number within `min..=max`.
pub fn parse_bounded(input: &str, min: i64, max: i64) -> Result<i64, InputError> {
    let value = parse_number(input)?;
    if value < min || value > max {
        return Err(InputError::OutOfRange { value, min, max });
    }
    Ok(value)
}

/// Comma-separated 1-based metric numbers. Repeats are collapsed; the
/// result is in catalog order.
pub fn parse_metric_selection(input: &str) -> Result<Vec<Metric>, InputError> {
    let mut chosen = BTreeSet::new();
    for token in input.split(',') {
        let n = parse_bounded(token, 1, Metric::ALL.len() as i64)?;
        chosen.insert(Metric::ALL[(n - 1) as usize]);
    }
    Ok(chosen.into_iter().collect())
}

/// Comma-separated filter numbers. `0` on its own selects no filters;
/// alongside other numbers it is ignored.
pub fn parse_filter_selection(input: &str) -> Result<Vec<FilterKind>, InputError> {
    let mut chosen = BTreeSet::new();
    for token in input.split(',') {
        let n = parse_bounded(token, 0, FilterKind::ALL.len() as i64)?;
        if n > 0 {
            chosen.insert(FilterKind::ALL[(n - 1) as usize]);
        }
    }
    Ok(chosen.into_iter().collect())
}

/// `1` for home, `0` for away.
pub fn parse_venue(input: &str) -> Result<Venue, InputError> {
    let flag = parse_bounded(input, 0, 1)?;
    Ok(if flag == 1 { Venue::Home } else { Venue::Away })
}

pub fn parse_year(input: &str) -> Result<i32, InputError> {
    let value = parse_number(input)?;
    i32::try_from(value).map_err(|_| InputError::NotANumber(input.trim().to_string()))
}

pub fn parse_year_range(start: &str, end: &str) -> Result<YearRange, InputError> {
    let start = parse_year(start)?;
    let end = parse_year(end)?;
    if start > end {
        return Err(InputError::ReversedYears { start, end });
    }
    Ok(YearRange { start, end })
}

/// `yes` or `no`, any case.
pub fn parse_yes_no(input: &str) -> Result<bool, InputError> {
    match input.trim().to_lowercase().as_str() {
        "yes" => Ok(true),
        "no" => Ok(false),
        _ => Err(InputError::NotYesNo),
    }
}

/// Lower-cased free text that must be one of `valid`.
pub fn parse_listed(input: &str, valid: &[String]) -> Result<String, InputError> {
    let wanted = input.trim().to_lowercase();
    if wanted.is_empty() {
        return Err(InputError::Empty);
    }
    if valid.iter().any(|v| *v == wanted) {
        Ok(wanted)
    } else {
        Err(InputError::NotListed(wanted))
    }
}

/// Non-empty, trimmed free text.
pub fn parse_text(input: &str) -> Result<String, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Prompter
// ---------------------------------------------------------------------------

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Prompter::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompter { input, output }
    }

    /// Print one line.
    pub fn say(&mut self, text: &str) -> Result<(), PromptError> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Print a question and read one line of input.
    pub fn read_line(&mut self, question: &str) -> Result<String, PromptError> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::EndOfInput);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Ask until `parse` accepts the answer.
    pub fn ask<T, F>(&mut self, question: &str, parse: F) -> Result<T, PromptError>
    where
        F: Fn(&str) -> Result<T, InputError>,
    {
        loop {
            let line = self.read_line(question)?;
            match parse(&line) {
                Ok(value) => return Ok(value),
                Err(e) => self.say(&format!("Invalid input: {e}. Please try again."))?,
            }
        }
    }

    pub fn ask_yes_no(&mut self, question: &str) -> Result<bool, PromptError> {
        self.ask(&format!("{question} (yes/no): "), parse_yes_no)
    }

    /// Ask for a start and end year until they form a valid range.
    pub fn ask_year_range(&mut self) -> Result<YearRange, PromptError> {
        loop {
            let start = self.read_line("Enter Start Year: ")?;
            let end = self.read_line("Enter End Year: ")?;
            match parse_year_range(&start, &end) {
                Ok(range) => return Ok(range),
                Err(e) => self.say(&format!("Invalid input: {e}. Please try again."))?,
            }
        }
    }

    /// Print a numbered menu starting at 1.
    pub fn menu<S: AsRef<str>>(&mut self, items: &[S]) -> Result<(), PromptError> {
        for (i, item) in items.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, item.as_ref())?;
        }
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn metric_selection_dedups_and_sorts() {
        let metrics = parse_metric_selection(" 3, 1,3 ,13").unwrap();
        assert_eq!(metrics, vec![Metric::TotalRuns, Metric::StrikeRate, Metric::PeakYear]);
    }

    #[test]
    fn metric_selection_rejects_bad_tokens() {
        assert_eq!(
            parse_metric_selection("1,x"),
            Err(InputError::NotANumber("x".into()))
        );
        assert_eq!(
            parse_metric_selection("14"),
            Err(InputError::OutOfRange { value: 14, min: 1, max: 13 })
        );
        assert!(matches!(parse_metric_selection("0"), Err(InputError::OutOfRange { .. })));
        assert_eq!(parse_metric_selection(""), Err(InputError::Empty));
        assert_eq!(parse_metric_selection("1,,2"), Err(InputError::Empty));
    }

    #[test]
    fn filter_selection_zero_handling() {
        assert_eq!(parse_filter_selection("0").unwrap(), Vec::<FilterKind>::new());
        assert_eq!(
            parse_filter_selection("0, 2").unwrap(),
            vec![FilterKind::YearRange]
        );
        assert_eq!(
            parse_filter_selection("3,1").unwrap(),
            vec![FilterKind::HomeAway, FilterKind::Opposition]
        );
        assert!(parse_filter_selection("4").is_err());
        assert!(parse_filter_selection("home").is_err());
    }

    #[test]
    fn venue_and_yes_no() {
        assert_eq!(parse_venue("1"), Ok(Venue::Home));
        assert_eq!(parse_venue(" 0 "), Ok(Venue::Away));
        assert!(parse_venue("2").is_err());
        assert_eq!(parse_yes_no(" YES "), Ok(true));
        assert_eq!(parse_yes_no("no"), Ok(false));
        assert_eq!(parse_yes_no("y"), Err(InputError::NotYesNo));
    }

    #[test]
    fn year_range_must_be_ordered() {
        assert_eq!(
            parse_year_range("2015", "2019"),
            Ok(YearRange { start: 2015, end: 2019 })
        );
        assert_eq!(
            parse_year_range("2019", "2015"),
            Err(InputError::ReversedYears { start: 2019, end: 2015 })
        );
        assert!(parse_year_range("twenty", "2015").is_err());
    }

    #[test]
    fn listed_values_are_lower_cased() {
        let valid = vec!["v india".to_string(), "v australia".to_string()];
        assert_eq!(parse_listed("  V India", &valid), Ok("v india".into()));
        assert_eq!(
            parse_listed("v nepal", &valid),
            Err(InputError::NotListed("v nepal".into()))
        );
    }

    #[test]
    fn ask_retries_until_valid() {
        let mut p = prompter("abc\n7\n2\n");
        let n = p.ask("Pick: ", |s| parse_bounded(s, 1, 4)).unwrap();
        assert_eq!(n, 2);
        let out = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(out.matches("Invalid input").count(), 2);
        assert!(out.contains("`abc` is not a number"));
    }

    #[test]
    fn end_of_input_aborts() {
        let mut p = prompter("maybe\n");
        assert!(matches!(
            p.ask_yes_no("Continue?"),
            Err(PromptError::EndOfInput)
        ));
    }

    #[test]
    fn year_range_prompt_reasks_both_years() {
        let mut p = prompter("2020\n2010\n2010\n2020\n");
        let range = p.ask_year_range().unwrap();
        assert_eq!(range, YearRange { start: 2010, end: 2020 });
    }

    #[test]
    fn menu_is_numbered_from_one() {
        let mut p = prompter("");
        p.menu(&["Total Runs", "Batting Average"]).unwrap();
        let out = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(out, "1. Total Runs\n2. Batting Average\n");
    }
}
