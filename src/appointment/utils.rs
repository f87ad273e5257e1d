use anyhow::{bail, Context};
use chrono::NaiveDate;
use diesel::{prelude::*, SqliteConnection};
use std::collections::HashSet;

use crate::models::{appointments::AppointmentStatus, slots::SlotGrid};

/// `None`, an empty string and `All` mean no status filter.
pub fn parse_status_filter(status: Option<&str>) -> anyhow::Result<Option<AppointmentStatus>> {
    match status.map(str::trim) {
        None | Some("") | Some("All") => Ok(None),
        Some(status) => status.parse().map(Some),
    }
}

/// Column values accepted by a status filter.
pub fn filter_statuses(filter: Option<AppointmentStatus>) -> Vec<&'static str> {
    match filter {
        Some(filter) => filter.group().iter().map(|status| status.as_str()).collect(),
        None => AppointmentStatus::ALL
            .iter()
            .map(|status| status.as_str())
            .collect(),
    }
}

pub fn assert_slot_time(grid: &SlotGrid, time: &str) -> anyhow::Result<()> {
    if !grid.contains(time.trim()) {
        bail!("Invalid time slot");
    }
    Ok(())
}

/// Start times on `date` held by appointments other than `exclude`.
pub fn taken_times(
    conn: &mut SqliteConnection,
    date: NaiveDate,
    exclude: Option<i32>,
) -> anyhow::Result<HashSet<String>> {
    use crate::schema::appointments;

    let rows = appointments::table
        .filter(appointments::scheduled_date.eq(date))
        .filter(appointments::status.ne(AppointmentStatus::Cancelled.as_str()))
        .filter(appointments::id.ne(exclude.unwrap_or(-1)))
        .select(appointments::scheduled_time)
        .load::<String>(conn)
        .context("DB error")?;
    Ok(rows.into_iter().collect())
}

pub fn assert_slot_free(
    conn: &mut SqliteConnection,
    date: NaiveDate,
    time: &str,
    exclude: Option<i32>,
) -> anyhow::Result<()> {
    if taken_times(conn, date, exclude)?.contains(time) {
        bail!("Time slot is already taken");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_all_mean_no_filter() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some("")).unwrap(), None);
        assert_eq!(parse_status_filter(Some("All")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("Pending")).unwrap(),
            Some(AppointmentStatus::Pending)
        );
        assert!(parse_status_filter(Some("Rejected")).is_err());
    }

    #[test]
    fn approved_filter_selects_rescheduled_rows() {
        assert_eq!(
            filter_statuses(Some(AppointmentStatus::Approved)),
            vec!["Approved", "Rescheduled"]
        );
        assert_eq!(filter_statuses(None).len(), 5);
    }

    #[test]
    fn slot_time_must_be_on_the_grid() {
        let grid = SlotGrid::default();
        assert!(assert_slot_time(&grid, "09:00").is_ok());
        assert!(assert_slot_time(&grid, "09:30").is_err());
        assert!(assert_slot_time(&grid, "17:00").is_err());
    }
}
