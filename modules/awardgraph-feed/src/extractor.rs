use awardgraph_common::{ContractAward, ExtractionFailure, FeedEntry, FieldProblem};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

/// Namespace the FPDS payload binds its award elements to.
pub const FPDS_NS: &str = "https://www.fpds.gov/FPDS";

/// Raw per-field text pulled from the payload before validation.
#[derive(Debug, Default)]
struct RawAward {
    piid: Option<String>,
    agency_code: Option<String>,
    agency_name: Option<String>,
    award_status: Option<String>,
    signed_date: Option<String>,
    obligated_amount: Option<String>,
    vendor_uei: Option<String>,
    cage_code: Option<String>,
    naics_code: Option<String>,
}

/// Parse one entry's embedded FPDS XML into a validated award.
///
/// Pure transformation: every missing or unparseable required field is
/// aggregated into a single failure naming the entry, rather than
/// short-circuiting on the first problem. Optional fields (cage code,
/// NAICS code) default to absent when their nodes are missing.
pub fn extract(entry: &FeedEntry) -> Result<ContractAward, ExtractionFailure> {
    let raw = scan_payload(&entry.content).map_err(|problem| ExtractionFailure {
        entry_id: entry.id.clone(),
        problems: vec![FieldProblem::new("content", problem)],
    })?;
    validate(&entry.id, raw)
}

/// Walk the payload collecting field text, matching elements by local name
/// within the FPDS namespace. Nesting depth is irrelevant: FPDS element
/// names are unique within an award document.
fn scan_payload(xml: &str) -> Result<RawAward, String> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut raw = RawAward::default();

    loop {
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(e))) => {
                if !in_fpds_ns(&ns) {
                    continue;
                }
                match e.local_name().as_ref() {
                    b"PIID" => raw.piid = read_text(&mut reader)?,
                    b"agencyID" => {
                        raw.agency_name = attr_value(&e, b"name");
                        raw.agency_code = read_text(&mut reader)?;
                    }
                    b"status" => {
                        raw.award_status = Some(attr_value(&e, b"description").unwrap_or_default())
                    }
                    b"signedDate" => raw.signed_date = read_text(&mut reader)?,
                    b"obligatedAmount" => raw.obligated_amount = read_text(&mut reader)?,
                    b"UEI" => raw.vendor_uei = read_text(&mut reader)?,
                    b"cageCode" => raw.cage_code = read_text(&mut reader)?,
                    b"principalNAICSCode" => raw.naics_code = read_text(&mut reader)?,
                    _ => {}
                }
            }
            Ok((ns, Event::Empty(e))) => {
                if !in_fpds_ns(&ns) {
                    continue;
                }
                if e.local_name().as_ref() == b"status" {
                    raw.award_status = Some(attr_value(&e, b"description").unwrap_or_default());
                }
            }
            Ok((_, Event::Eof)) => break,
            Err(e) => return Err(format!("malformed XML: {e}")),
            Ok(_) => {}
        }
    }

    Ok(raw)
}

fn in_fpds_ns(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(n)) if *n == FPDS_NS.as_bytes())
}

fn read_text(reader: &mut NsReader<&[u8]>) -> Result<Option<String>, String> {
    match reader.read_resolved_event() {
        Ok((_, Event::Text(t))) => {
            let text = t.unescape().map_err(|e| format!("malformed XML: {e}"))?;
            let text = text.trim();
            if text.is_empty() {
                Ok(None)
            } else {
                Ok(Some(text.to_string()))
            }
        }
        Ok(_) => Ok(None),
        Err(e) => Err(format!("malformed XML: {e}")),
    }
}

fn attr_value(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

fn validate(entry_id: &str, raw: RawAward) -> Result<ContractAward, ExtractionFailure> {
    let mut problems = Vec::new();

    let piid = required(raw.piid, "PIID", &mut problems);
    let agency_code = required(raw.agency_code, "agencyID", &mut problems);
    let award_status = required(raw.award_status, "status", &mut problems);
    let vendor_uei = required(raw.vendor_uei, "UEI", &mut problems);

    let date_signed = match raw.signed_date {
        Some(text) => match parse_signed_date(&text) {
            Some(dt) => Some(dt),
            None => {
                problems.push(FieldProblem::new(
                    "signedDate",
                    format!("unparseable date: {text}"),
                ));
                None
            }
        },
        None => {
            problems.push(FieldProblem::new("signedDate", "missing"));
            None
        }
    };

    let obligated_amount = match raw.obligated_amount {
        Some(text) => match text.parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount >= 0.0 => Some(amount),
            Ok(_) => {
                problems.push(FieldProblem::new(
                    "obligatedAmount",
                    format!("negative or non-finite amount: {text}"),
                ));
                None
            }
            Err(_) => {
                problems.push(FieldProblem::new(
                    "obligatedAmount",
                    format!("unparseable amount: {text}"),
                ));
                None
            }
        },
        None => {
            problems.push(FieldProblem::new("obligatedAmount", "missing"));
            None
        }
    };

    if !problems.is_empty() {
        return Err(ExtractionFailure {
            entry_id: entry_id.to_string(),
            problems,
        });
    }

    Ok(ContractAward {
        piid: piid.unwrap(),
        agency_code: agency_code.unwrap(),
        agency_name: raw.agency_name.unwrap_or_default(),
        award_status: award_status.unwrap(),
        date_signed: date_signed.unwrap(),
        obligated_amount: obligated_amount.unwrap(),
        vendor_uei: vendor_uei.unwrap(),
        cage_code: raw.cage_code,
        naics_code: raw.naics_code,
    })
}

fn required(
    value: Option<String>,
    field: &str,
    problems: &mut Vec<FieldProblem>,
) -> Option<String> {
    if value.is_none() {
        problems.push(FieldProblem::new(field, "missing"));
    }
    value
}

/// FPDS timestamps look like "2024-03-01 00:00:00"; only the leading date
/// token is meaningful, so trailing time/timezone text is discarded.
fn parse_signed_date(text: &str) -> Option<DateTime<Utc>> {
    let token = text.split_whitespace().next()?;
    if let Ok(dt) = NaiveDateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
