//! Plain text rendering of booking code re-validation.
//!
//! `Summary` prints the market header with the RBD hierarchy table; `Detail`
//! prints the header plus every recorded check and the result line of each
//! candidate.

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{AirSegment, CarrierCode, ClassOfService, ExchangeType, LocCode};
use crate::rbd::trace::{FareSummary, OutcomeReason, OutcomeRecord, RbdTrace, TraceStep};

const RULE: &str = "------------------------------------------------------------- ";
const BANNER: &str = "************************************************************* ";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLevel {
    #[default]
    Off,
    Summary,
    Detail,
}

impl DiagnosticLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Summary => "summary",
            Self::Detail => "detail",
        }
    }
}

impl FromStr for DiagnosticLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "summary" | "400" => Ok(Self::Summary),
            "detail" | "411" => Ok(Self::Detail),
            other => Err(format!("unsupported diagnostic level `{other}`")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PreviousFareLine {
    pub fare_class: String,
    pub board_city: LocCode,
    pub governing_carrier: CarrierCode,
    pub off_city: LocCode,
    pub nuc_amount: Decimal,
    pub normal: bool,
    /// Resolved cabins when the fare took part in validation.
    pub classes: Option<Vec<ClassOfService>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlightLine {
    Air(AirSegment),
    Arunk,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MarketStatus {
    Unflown { city_pair: String },
    SameFareBreak,
    FareBreakChanged { city_pair: String, hierarchy: Vec<FareSummary> },
    AllPreviousNormal,
    NoMatch,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticHeader {
    pub exchange_type: ExchangeType,
    pub ticketing_date: NaiveDate,
    pub previous_fares: Vec<PreviousFareLine>,
    pub flights: Vec<FlightLine>,
    pub status: MarketStatus,
}

pub fn render_header(header: &DiagnosticHeader, level: DiagnosticLevel) -> String {
    let mut out = String::new();
    if level == DiagnosticLevel::Off {
        return out;
    }

    let _ = writeln!(out, "{BANNER}");
    let _ = writeln!(
        out,
        "{} RBD PROCESSING - FARE RETRIEVAL DATE - {} ",
        header.exchange_type.category_label(),
        header.ticketing_date.format("%Y-%m-%d")
    );
    let _ = writeln!(out, "PREVIOUS FARES   : ");
    for fare in &header.previous_fares {
        let _ = write!(
            out,
            "{:<14} {}-{}-{}{:>14} {} ",
            fare.fare_class,
            fare.board_city,
            fare.governing_carrier,
            fare.off_city,
            money(fare.nuc_amount),
            if fare.normal { "NL" } else { "SP" }
        );
        if let Some(classes) = &fare.classes {
            let _ = write!(out, "RBD/CAB: {}", rbd_cabin_pairs(classes));
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "NEW ITIN FLIGHTS :  ");
    for flight in &header.flights {
        match flight {
            FlightLine::Air(segment) => {
                let _ = writeln!(
                    out,
                    "{} {} ",
                    segment_line(segment),
                    if segment.flown { "FLOWN" } else { "UNFLOWN" }
                );
            }
            FlightLine::Arunk => {
                let _ = writeln!(out, "--- ARUNK --- ");
            }
        }
    }

    match &header.status {
        MarketStatus::Unflown { city_pair } => {
            let _ = writeln!(out, " \nUNFLOWN FARE MARKET {city_pair} -STANDARD RBD APPLY ");
        }
        MarketStatus::SameFareBreak => {}
        MarketStatus::FareBreakChanged { city_pair, hierarchy } => {
            let _ = writeln!(out, " \nFARE MARKET {city_pair} -FARE BREAK CHANGE -RBD HIERARCHY APPLY ");
            if level == DiagnosticLevel::Summary {
                render_hierarchy(&mut out, hierarchy);
            }
        }
        MarketStatus::AllPreviousNormal => {
            let _ = writeln!(out, " \nALL PREVIOUS MATCHED FARES NORMAL -STANDARD RBD APPLY ");
        }
        MarketStatus::NoMatch => {
            let _ = writeln!(out, " \nNO MATCH PREVIOUS FARES -STANDARD RBD APPLY ");
        }
    }
    out
}

/// Checks and result line of one candidate. Only the detail level prints them.
pub fn render_trace(trace: &RbdTrace, level: DiagnosticLevel) -> String {
    let mut out = String::new();
    if level != DiagnosticLevel::Detail {
        return out;
    }

    for step in &trace.steps {
        match step {
            TraceStep::CabinCheck { fare, classes, passed } => {
                let _ = writeln!(
                    out,
                    "  {} {:>14}  PRIME RBD: {}{} ",
                    fare.fare_class,
                    money(fare.nuc_amount),
                    rbd_cabin_pairs(classes),
                    if *passed { "-PASS CABIN" } else { "-FAIL CABIN" }
                );
            }
            TraceStep::SegmentCabinCheck { segment, passed } => {
                let _ = writeln!(
                    out,
                    "  {} {:<7} {} ",
                    segment_line(segment),
                    if segment.flown { "FLOWN" } else { "UNFLOWN" },
                    if *passed { "CABIN CHECK PASS" } else { "CABIN CHECK FAIL" }
                );
            }
            TraceStep::EntryPoint { entry, previous, passed } => {
                let _ = write!(out, "  RBD HIERARCHY ENTRY POINT: ");
                match entry {
                    Some(fare) => {
                        let _ = writeln!(
                            out,
                            " \n    {} {} ",
                            fare_row(fare, 5),
                            if fare.normal { "NL" } else { "SP" }
                        );
                        let _ = writeln!(
                            out,
                            "{}",
                            if *passed {
                                "  AMOUNT HIGHER/EQUAL -RBD HIERARCHY PASS "
                            } else {
                                "  LOWER AMOUNT -RBD HIERARCHY FAIL "
                            }
                        );
                    }
                    None => {
                        let _ = writeln!(out, "*** NOT FOUND *** ");
                        let _ = writeln!(out, "  PREVIOUS FARES AND FARE CABINS: ");
                        for fare in previous {
                            let cabins: String =
                                fare.cabins.iter().map(|cabin| cabin.code()).collect();
                            let _ = writeln!(
                                out,
                                "    {:<13} CABIN: {cabins} ",
                                truncate_fare_class(&fare.fare_class)
                            );
                        }
                        let _ = writeln!(
                            out,
                            " \n{}",
                            if *passed {
                                "  NO ENTRY POINT -HIGHER/EQUAL FARE CABIN -PASS "
                            } else {
                                "  NO ENTRY POINT -LOWER FARE CABIN -FAIL "
                            }
                        );
                    }
                }
            }
            TraceStep::Outcome(record) => {
                let _ = writeln!(out, "{}", result_line(record));
            }
        }
    }
    out
}

/// One line summary of a candidate outcome.
pub fn result_line(record: &OutcomeRecord) -> String {
    let label = record.exchange_type.category_label();
    let amount = money(record.nuc_amount);
    let text = match record.reason {
        OutcomeReason::PassAllFlown => format!("PASS FARE-ALL FLOWN {amount:>14}"),
        OutcomeReason::SkipFlownSegments => format!("SKIP FLOWN SEGS {amount:>14}"),
        OutcomeReason::FailLowerFareAmount => format!("FAIL LOWER FARE AMT {amount:>14}"),
        OutcomeReason::FailCabinCheck => "FAIL CABIN CHECK".to_owned(),
        OutcomeReason::PassCabinAllFlown => "PASS FARE -CABIN PASS -ALL FLOWN".to_owned(),
        OutcomeReason::PassHierarchyAllFlown => {
            "PASS FARE -RBD HIERARCHY PASS -ALL FLOWN".to_owned()
        }
        OutcomeReason::FailHierarchy => "FAIL FARE -RBD HIERARCHY FAIL".to_owned(),
        OutcomeReason::StandardRbdApply => "STANDARD RBD APPLY".to_owned(),
        OutcomeReason::PostponedToPhase2 => "POSTPONED TO PHASE 2 - FARE PATH REQUIRED".to_owned(),
    };
    format!("  {label} RBD - {text} ")
}

fn render_hierarchy(out: &mut String, hierarchy: &[FareSummary]) {
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "HIERARCHY TABLE : ");
    let _ = writeln!(out, " FARE CLASS       AMOUNT  CUR O/R  EFF DATE   PRIME BKG ");
    let _ = writeln!(out, "- - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - ");
    for fare in hierarchy {
        let _ = writeln!(out, "{} ", fare_row(fare, 7));
    }
}

fn fare_row(fare: &FareSummary, max_codes: usize) -> String {
    let codes = if fare.booking_codes.is_empty() {
        "*".to_owned()
    } else {
        let mut shown: Vec<&str> =
            fare.booking_codes.iter().take(max_codes).map(String::as_str).collect();
        if fare.booking_codes.len() > max_codes {
            shown.push("*");
        }
        shown.join(" ")
    };
    format!(
        "{:<13} {:>14}  {:<2}  {} {}",
        truncate_fare_class(&fare.fare_class),
        money(fare.nuc_amount),
        fare.owrt,
        fare.effective_date.format("%Y-%m-%d"),
        codes
    )
}

fn segment_line(segment: &AirSegment) -> String {
    format!(
        "{}. {}{:>4}{} {} {} CAB: {}",
        segment.pnr_segment,
        segment.carrier,
        segment.flight_number,
        segment.booking_code,
        segment.origin,
        segment.destination,
        segment.booked_cabin
    )
}

fn rbd_cabin_pairs(classes: &[ClassOfService]) -> String {
    classes
        .iter()
        .map(|class| format!("{}/{} ", class.booking_code, class.cabin))
        .collect()
}

fn truncate_fare_class(fare_class: &str) -> String {
    if fare_class.chars().count() > 12 {
        let head: String = fare_class.chars().take(12).collect();
        format!("{head}*")
    } else {
        fare_class.to_owned()
    }
}

fn money(amount: Decimal) -> String {
    format!("{:.2} NUC", amount)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{
        render_header, render_trace, result_line, truncate_fare_class, DiagnosticHeader,
        DiagnosticLevel, FlightLine, MarketStatus,
    };
    use crate::domain::ExchangeType;
    use crate::rbd::trace::{FareSummary, OutcomeReason, OutcomeRecord, RbdTrace, TraceStep};
    use crate::rbd::validator::Cat31Result;

    fn summary(fare_class: &str, codes: &[&str]) -> FareSummary {
        FareSummary {
            fare_class: fare_class.to_owned(),
            nuc_amount: Decimal::new(80000, 2),
            normal: false,
            owrt: 'X',
            effective_date: NaiveDate::from_ymd_opt(2010, 1, 1).expect("valid date"),
            booking_codes: codes.iter().map(|code| (*code).to_owned()).collect(),
        }
    }

    fn header(status: MarketStatus) -> DiagnosticHeader {
        DiagnosticHeader {
            exchange_type: ExchangeType::Reissue,
            ticketing_date: NaiveDate::from_ymd_opt(2010, 5, 1).expect("valid date"),
            previous_fares: Vec::new(),
            flights: vec![FlightLine::Arunk],
            status,
        }
    }

    #[test]
    fn levels_parse_from_names_and_numbers() {
        assert_eq!("summary".parse::<DiagnosticLevel>(), Ok(DiagnosticLevel::Summary));
        assert_eq!("411".parse::<DiagnosticLevel>(), Ok(DiagnosticLevel::Detail));
        assert_eq!(" OFF ".parse::<DiagnosticLevel>(), Ok(DiagnosticLevel::Off));
        assert!("verbose".parse::<DiagnosticLevel>().is_err());
    }

    #[test]
    fn summary_header_prints_hierarchy_table_with_capped_codes() {
        let status = MarketStatus::FareBreakChanged {
            city_pair: "MCN-STT".to_owned(),
            hierarchy: vec![summary("BLONGFARECLASS1", &["A", "B", "C", "D", "E", "F", "G", "H"])],
        };
        let text = render_header(&header(status.clone()), DiagnosticLevel::Summary);

        assert!(text.contains("CAT 31 RBD PROCESSING - FARE RETRIEVAL DATE - 2010-05-01"));
        assert!(text.contains("--- ARUNK ---"));
        assert!(text.contains("FARE MARKET MCN-STT -FARE BREAK CHANGE -RBD HIERARCHY APPLY"));
        assert!(text.contains("HIERARCHY TABLE"));
        assert!(text.contains("BLONGFARECLA*"));
        assert!(text.contains("800.00 NUC"));
        assert!(text.contains("A B C D E F G *"));

        let detail = render_header(&header(status), DiagnosticLevel::Detail);
        assert!(!detail.contains("HIERARCHY TABLE"));
        assert!(render_header(&header(MarketStatus::NoMatch), DiagnosticLevel::Off).is_empty());
    }

    #[test]
    fn market_status_lines() {
        let unflown = render_header(
            &header(MarketStatus::Unflown { city_pair: "MCN-ATL".to_owned() }),
            DiagnosticLevel::Detail,
        );
        assert!(unflown.contains("UNFLOWN FARE MARKET MCN-ATL -STANDARD RBD APPLY"));

        let normal = render_header(&header(MarketStatus::AllPreviousNormal), DiagnosticLevel::Detail);
        assert!(normal.contains("ALL PREVIOUS MATCHED FARES NORMAL -STANDARD RBD APPLY"));

        let none = render_header(&header(MarketStatus::NoMatch), DiagnosticLevel::Detail);
        assert!(none.contains("NO MATCH PREVIOUS FARES -STANDARD RBD APPLY"));
    }

    #[test]
    fn result_lines_are_labelled_by_exchange_type() {
        let record = OutcomeRecord {
            exchange_type: ExchangeType::Refund,
            result: Cat31Result::PostponedToPhase2,
            reason: OutcomeReason::PostponedToPhase2,
            nuc_amount: Decimal::new(100, 0),
        };
        assert_eq!(
            result_line(&record).trim_end(),
            "  CAT 33 RBD - POSTPONED TO PHASE 2 - FARE PATH REQUIRED"
        );

        let lower = OutcomeRecord {
            exchange_type: ExchangeType::Reissue,
            result: Cat31Result::Failed,
            reason: OutcomeReason::FailLowerFareAmount,
            nuc_amount: Decimal::new(9950, 2),
        };
        let line = result_line(&lower);
        assert!(line.starts_with("  CAT 31 RBD - FAIL LOWER FARE AMT"));
        assert!(line.contains("99.50 NUC"));
    }

    #[test]
    fn trace_renders_only_at_detail_level() {
        let trace = RbdTrace {
            steps: vec![TraceStep::EntryPoint {
                entry: Some(summary("B14", &["B"])),
                previous: Vec::new(),
                passed: true,
            }],
        };

        assert!(render_trace(&trace, DiagnosticLevel::Summary).is_empty());
        let detail = render_trace(&trace, DiagnosticLevel::Detail);
        assert!(detail.contains("RBD HIERARCHY ENTRY POINT"));
        assert!(detail.contains("AMOUNT HIGHER/EQUAL -RBD HIERARCHY PASS"));
        assert_eq!(truncate_fare_class("SHORT"), "SHORT");
    }
}
