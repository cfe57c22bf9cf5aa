use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::calendar::{daily_series, month_grid, parse_month_opt, YearMonth};
use crate::error::Result;
use crate::fmt::compact;
use crate::ledger::list_accounts;
use crate::models::{Account, Transaction};
use crate::reports::{self, DaySummary, Heat};
use crate::tui::{heat_style, money_span, run_view, View, ViewAction, FOOTER_STYLE, HEADER_STYLE, VIRTUAL_STYLE};

const WEEKDAYS: &str = " Mo  Tu  We  Th  Fr  Sa  Su";

pub(crate) struct DashboardData {
    pub accounts: Vec<Account>,
    pub recent: Vec<Transaction>,
    /// One entry per day of the month, zero-filled.
    pub series: Vec<DaySummary>,
    pub heat: Vec<(NaiveDate, Heat)>,
    pub month_income: f64,
    pub month_expense: f64,
}

pub(crate) fn load_data(conn: &Connection, month: YearMonth, recent_limit: usize) -> Result<DashboardData> {
    let accounts = list_accounts(conn)?;
    let recent = reports::recent_transactions(conn, recent_limit)?;
    let summary = reports::daily_summary(conn, month.year, month.month)?;
    let series = daily_series(month, &summary);

    let mut heat = Vec::new();
    for date in month.dates() {
        heat.push((date, reports::activity_for_date(conn, date)?.heat()));
    }

    Ok(DashboardData {
        accounts,
        recent,
        month_income: summary.iter().map(|d| d.income).sum(),
        month_expense: summary.iter().map(|d| d.expense).sum(),
        series,
        heat,
    })
}

struct Dashboard {
    conn: Connection,
    month: YearMonth,
    recent_limit: usize,
    data: Option<DashboardData>,
}

impl Dashboard {
    fn heat_for(&self, date: NaiveDate) -> Heat {
        self.data
            .as_ref()
            .and_then(|d| d.heat.iter().find(|(day, _)| *day == date))
            .map(|(_, h)| *h)
            .unwrap_or(Heat::None)
    }

    fn draw_accounts(&self, frame: &mut Frame, area: Rect, data: &DashboardData) {
        let mut lines = vec![Line::from(Span::styled(
            " Account Balances",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for acct in &data.accounts {
            let name_style = if acct.is_virtual {
                VIRTUAL_STYLE
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {:<12}", acct.name), name_style),
                money_span(acct.balance),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw(" Month in    "),
            money_span(data.month_income),
        ]));
        lines.push(Line::from(vec![
            Span::raw(" Month out   "),
            money_span(-data.month_expense),
        ]));
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_recent(&self, frame: &mut Frame, area: Rect, data: &DashboardData) {
        let mut lines = vec![Line::from(Span::styled(
            " Recent Transactions",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for t in &data.recent {
            let time = t.timestamp.get(5..16).unwrap_or(&t.timestamp).to_string();
            lines.push(Line::from(vec![
                Span::styled(format!(" {time}  "), FOOTER_STYLE),
                Span::raw(format!("{:<10}", t.account_name)),
                money_span(t.kind.signed(t.amount)),
                Span::raw(format!("  {}", t.description.as_deref().or(t.category.as_deref()).unwrap_or(""))),
            ]));
        }
        if data.recent.is_empty() {
            lines.push(Line::from(Span::styled(" No transactions yet.", FOOTER_STYLE)));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_chart(&self, frame: &mut Frame, area: Rect, data: &DashboardData) {
        let income_style = Style::default().fg(Color::Rgb(80, 220, 100));
        let expense_style = Style::default().fg(Color::Red);

        let max_val = data
            .series
            .iter()
            .map(|d| d.income.max(d.expense))
            .fold(0.0_f64, f64::max);

        let groups: Vec<BarGroup> = data
            .series
            .iter()
            .map(|d| {
                let label = if d.day == 1 || d.day % 5 == 0 {
                    d.day.to_string()
                } else {
                    String::new()
                };
                let bars = vec![
                    Bar::default().value(d.income.max(0.0) as u64).text_value(String::new()).style(income_style),
                    Bar::default().value(d.expense.max(0.0) as u64).text_value(String::new()).style(expense_style),
                ];
                BarGroup::default().label(Line::from(label)).bars(&bars)
            })
            .collect();

        let title = format!("Daily Income / Expense (max {})", compact(max_val));
        let block = Block::default()
            .title(title)
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .borders(Borders::NONE);

        let mut chart = BarChart::default()
            .block(block)
            .bar_width(1)
            .bar_gap(0)
            .group_gap(1);
        for group in &groups {
            chart = chart.data(group.clone());
        }
        frame.render_widget(chart, area);
    }

    fn draw_calendar(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::from(Span::styled(
                format!(" {}", self.month.title()),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(WEEKDAYS, FOOTER_STYLE)),
        ];
        for week in month_grid(self.month) {
            let mut spans = Vec::new();
            for cell in week {
                spans.push(Span::raw(" "));
                match cell {
                    Some(date) => spans.push(Span::styled(
                        format!("{:>2}", date.day()),
                        heat_style(self.heat_for(date)),
                    )),
                    None => spans.push(Span::raw("  ")),
                }
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled("  ", heat_style(Heat::Both)),
            Span::raw(" both  "),
            Span::styled("  ", heat_style(Heat::Charity)),
            Span::raw(" sedekah"),
        ]));
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled("  ", heat_style(Heat::Saving)),
            Span::raw(" menabung  "),
            Span::styled("  ", heat_style(Heat::Activity)),
            Span::raw(" other"),
        ]));
        frame.render_widget(Paragraph::new(lines), area);
    }
}

impl View for Dashboard {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);
        let account_rows = self.data.as_ref().map(|d| d.accounts.len()).unwrap_or(7) as u16 + 4;

        let [header_area, sep1, top_area, sep2, bottom_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(account_rows),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(format!(" dompet: {}", self.month.title())).style(HEADER_STYLE),
            header_area,
        );

        let sep_line = "━".repeat(area.width as usize);
        let sep_widget = Paragraph::new(sep_line.as_str()).style(border_style);
        frame.render_widget(sep_widget.clone(), sep1);
        frame.render_widget(sep_widget, sep2);

        if let Some(data) = &self.data {
            let [accounts_area, recent_area] =
                Layout::horizontal([Constraint::Length(32), Constraint::Fill(1)]).areas(top_area);
            self.draw_accounts(frame, accounts_area, data);
            self.draw_recent(frame, recent_area, data);

            let [chart_area, calendar_area] =
                Layout::horizontal([Constraint::Fill(1), Constraint::Length(30)]).areas(bottom_area);
            self.draw_chart(frame, chart_area, data);
            self.draw_calendar(frame, calendar_area);
        }

        frame.render_widget(
            Paragraph::new(" Left/Right=month  t=this month  r=refresh  q=quit").style(FOOTER_STYLE),
            hints_area,
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => ViewAction::Close,
            KeyCode::Left | KeyCode::Char('h') => {
                self.month = self.month.prev();
                ViewAction::Reload
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.month = self.month.next();
                ViewAction::Reload
            }
            KeyCode::Char('t') => {
                self.month = YearMonth::current();
                ViewAction::Reload
            }
            KeyCode::Char('r') => ViewAction::Reload,
            _ => ViewAction::Continue,
        }
    }

    fn reload(&mut self) -> Result<()> {
        self.data = Some(load_data(&self.conn, self.month, self.recent_limit)?);
        Ok(())
    }
}

pub fn run(month: Option<String>) -> Result<()> {
    let month = parse_month_opt(month.as_deref())?;
    let (settings, conn) = super::open()?;
    let mut dashboard = Dashboard {
        conn,
        month,
        recent_limit: settings.recent_limit,
        data: None,
    };
    dashboard.reload()?;
    run_view(&mut dashboard)
}
