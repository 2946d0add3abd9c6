use awardgraph_common::{AwardGraphError, SearchCriteria};

/// Render search criteria as the FPDS query fragment appended to the base
/// feed URL. Clauses are concatenated directly in a fixed field order; the
/// feed treats adjacent clauses as an implicit AND.
///
/// An inverted date range (start after end) is rejected before any network
/// call is made.
pub fn build_query(criteria: &SearchCriteria, base_url: &str) -> Result<String, AwardGraphError> {
    let mut url = String::from(base_url);

    if let Some((start, end)) = criteria.last_mod_date {
        if start > end {
            return Err(AwardGraphError::Encoding(format!(
                "inverted LAST_MOD_DATE range: {start} is after {end}"
            )));
        }
        url.push_str(&format!(
            "LAST_MOD_DATE:[{},{}]",
            start.format("%Y/%m/%d"),
            end.format("%Y/%m/%d")
        ));
    }

    if let Some(code) = &criteria.agency_code {
        url.push_str(&format!("AGENCY_CODE:\"{code}\""));
    }

    // Agency names carry spaces and punctuation; everything else is inserted
    // verbatim in quotes.
    if let Some(name) = &criteria.agency_name {
        url.push_str(&format!("AGENCY_NAME:\"{}\"", urlencoding::encode(name)));
    }

    if let Some(status) = &criteria.award_status {
        url.push_str(&format!("AWARD_STATUS:\"{status}\""));
    }

    if let Some(contract_type) = &criteria.contract_type {
        url.push_str(&format!("CONTRACT_TYPE:\"{contract_type}\""));
    }

    if let Some(piid) = &criteria.piid {
        url.push_str(&format!("PIID:\"{piid}\""));
    }

    if let Some(uei) = &criteria.vendor_uei {
        url.push_str(&format!("VENDOR_UEI:\"{uei}\""));
    }

    if let Some(cage) = &criteria.cage_code {
        url.push_str(&format!("CAGE_CODE:\"{cage}\""));
    }

    if let Some(naics) = &criteria.naics_code {
        url.push_str(&format!("PRINCIPAL_NAICS_CODE:\"{naics}\""));
    }

    Ok(url)
}
