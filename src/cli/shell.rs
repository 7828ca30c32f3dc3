//! Interactive menu, run alongside the background refresh scheduler.

use super::{rates::NO_DATA, ui};
use crate::core::snapshot::normalize_code;
use crate::core::{
    ExchangeSnapshot, QueryError, RateQuery, RefreshEvent, RefreshService, SchedulerHandle,
    cross_rate,
};
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

const MENU: &str = "\
Choose an option:
1. Get Latest Exchange Rates
2. Get Cross Rate (e.g., GBP to USD)
3. View Stored Exchange Rates
4. Help
5. Exit";

const HELP: &str = "\
Available options:
1. Get Latest Exchange Rates: Fetches and displays the latest exchange rates.
2. Get Cross Rate: Calculates and displays the cross rate between two specified currencies.
3. View Stored Exchange Rates: Displays the stored exchange rates without fetching.
5. Exit: Exits the application.";

pub struct Shell<'a> {
    refresh: &'a RefreshService,
    query: &'a RateQuery,
    scheduler: Option<&'a mut SchedulerHandle>,
}

impl<'a> Shell<'a> {
    pub fn new(
        refresh: &'a RefreshService,
        query: &'a RateQuery,
        scheduler: Option<&'a mut SchedulerHandle>,
    ) -> Self {
        Self {
            refresh,
            query,
            scheduler,
        }
    }

    /// Runs the menu loop until the user exits or the input ends.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();

        loop {
            self.report_scheduler_events(out)?;
            writeln!(out, "\n{MENU}")?;
            out.flush()?;

            let Some(choice) = lines.next_line().await? else {
                break;
            };

            match choice.trim() {
                "1" => self.latest(out).await?,
                "2" => self.cross_rate(&mut lines, out).await?,
                "3" => self.stored(out).await?,
                "4" => writeln!(out, "{}", ui::style_text(HELP, ui::StyleType::Subtle))?,
                "5" => break,
                "" => {}
                other => writeln!(out, "Unknown option: {other}")?,
            }
        }

        Ok(())
    }

    fn report_scheduler_events<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let Some(scheduler) = self.scheduler.as_deref_mut() else {
            return Ok(());
        };

        while let Some(event) = scheduler.try_next_event() {
            match event {
                RefreshEvent::Updated {
                    base_currency,
                    currencies,
                } => writeln!(
                    out,
                    "[scheduled refresh] updated {currencies} rates against {base_currency}"
                )?,
                RefreshEvent::Failed { reason } => writeln!(
                    out,
                    "{}",
                    ui::style_text(
                        &format!("[scheduled refresh] failed: {reason}"),
                        ui::StyleType::Error
                    )
                )?,
            }
        }
        Ok(())
    }

    async fn latest<W: Write>(&self, out: &mut W) -> Result<()> {
        if let Err(e) = self.refresh.refresh().await {
            writeln!(
                out,
                "{}",
                ui::style_text(
                    &format!("Failed to fetch exchange rates ({e}); showing stored rates."),
                    ui::StyleType::Error
                )
            )?;
        }
        self.stored(out).await
    }

    async fn stored<W: Write>(&self, out: &mut W) -> Result<()> {
        match self.stored_snapshot().await? {
            Some(snapshot) => writeln!(out, "{}", ui::snapshot_table(&snapshot))?,
            None => writeln!(out, "{NO_DATA}")?,
        }
        Ok(())
    }

    async fn stored_snapshot(&self) -> Result<Option<ExchangeSnapshot>> {
        match self.query.latest().await {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(QueryError::NoData) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn cross_rate<R, W>(&self, lines: &mut Lines<R>, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let Some(snapshot) = self.stored_snapshot().await? else {
            writeln!(out, "{NO_DATA}")?;
            return Ok(());
        };

        let Some(from) = prompt_currency(lines, out, "source", "GBP", &snapshot).await? else {
            return Ok(());
        };
        let Some(to) = prompt_currency(lines, out, "target", "USD", &snapshot).await? else {
            return Ok(());
        };

        match cross_rate(&from, &to, &snapshot) {
            Ok(rate) => writeln!(out, "{}", ui::format_cross_rate(&from, &to, rate))?,
            Err(e) => writeln!(
                out,
                "{}",
                ui::style_text(
                    &format!("Could not calculate cross rate: {e}"),
                    ui::StyleType::Error
                )
            )?,
        }
        Ok(())
    }
}

/// Asks for a currency code; `None` when the answer is empty or not in the snapshot.
async fn prompt_currency<R, W>(
    lines: &mut Lines<R>,
    out: &mut W,
    side: &str,
    example: &str,
    snapshot: &ExchangeSnapshot,
) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "Enter the {side} currency (e.g., {example}): ")?;
    out.flush()?;

    let code = lines
        .next_line()
        .await?
        .map(|line| normalize_code(&line))
        .unwrap_or_default();

    if code.is_empty() || snapshot.rate(&code).is_none() {
        writeln!(out, "Invalid {side} currency.")?;
        return Ok(None);
    }
    Ok(Some(code))
}
