// ═══════════════════════════════════════════════════════════════════
// Service Tests — Forecast, CashFlow, SafeSpend, Budget, Summary,
// Analysis
// ═══════════════════════════════════════════════════════════════════

use chrono::{Duration, NaiveDate};

use ledger_insights_core::models::analysis::{AnalysisPayload, AnalysisRequest};
use ledger_insights_core::models::budget::{Budget, BudgetPeriod};
use ledger_insights_core::models::cash_flow::CashFlowPoint;
use ledger_insights_core::models::context::{
    CategorySpend, FinancialContext, FinancialSummary, RecurrenceFrequency, SpendingTrend,
};
use ledger_insights_core::models::data_point::DataPoint;
use ledger_insights_core::models::forecast::{PointKind, MAX_FORECAST_MONTHS};
use ledger_insights_core::models::safe_spend::{RiskLevel, SafeSpendMetrics};
use ledger_insights_core::models::subscription::Subscription;
use ledger_insights_core::models::transaction::Transaction;
use ledger_insights_core::models::account::Account;
use ledger_insights_core::services::analysis_service::AnalysisService;
use ledger_insights_core::services::budget_service::BudgetService;
use ledger_insights_core::services::cash_flow_service::CashFlowService;
use ledger_insights_core::services::forecast_service::ForecastService;
use ledger_insights_core::services::safe_spend_service::{SafeSpendInputs, SafeSpendService};
use ledger_insights_core::services::summary_service::{normalize_merchant, CashTotals, SummaryService};

fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    make_date(2025, 6, 15)
}

fn expense(amount: f64, date: NaiveDate, category: &str) -> Transaction {
    Transaction::new(-amount.abs(), date).with_category(category)
}

fn charge(amount: f64, date: NaiveDate, description: &str) -> Transaction {
    Transaction::new(-amount.abs(), date).with_description(description)
}

fn value_on(points: &[CashFlowPoint], date: NaiveDate) -> f64 {
    points
        .iter()
        .find(|p| p.date == date)
        .map(|p| p.value)
        .unwrap_or_else(|| panic!("no point on {date}"))
}

// ── ForecastService ─────────────────────────────────────────────────

mod forecast_service {
    use super::*;

    fn daily_line() -> Vec<DataPoint> {
        (0..10)
            .map(|i| DataPoint::new(make_date(2025, 3, 1) + Duration::days(i), 100.0 + 10.0 * i as f64))
            .collect()
    }

    #[test]
    fn empty_history_yields_nothing() {
        let forecast = ForecastService::new().generate(&[], 3);
        assert!(forecast.model.is_none());
        assert!(forecast.forecast.is_empty());
    }

    #[test]
    fn produces_one_point_per_month() {
        let forecast = ForecastService::new().generate(&daily_line(), 2);
        assert!(forecast.model.is_some());
        assert_eq!(forecast.forecast.len(), 2);

        let april = &forecast.forecast[0];
        assert_eq!(april.date, make_date(2025, 4, 1));
        assert_eq!(april.label, "Apr");
        assert_eq!(april.kind, PointKind::Projected);
        assert_eq!(april.value, 410.0); // day 31

        let may = &forecast.forecast[1];
        assert_eq!(may.date, make_date(2025, 5, 1));
        assert_eq!(may.label, "May");
        assert_eq!(may.value, 710.0); // day 61
    }

    #[test]
    fn zero_months_ahead_keeps_model() {
        let forecast = ForecastService::new().generate(&daily_line(), 0);
        assert!(forecast.model.is_some());
        assert!(forecast.forecast.is_empty());
    }

    #[test]
    fn horizon_is_capped() {
        let forecast = ForecastService::new().generate(&daily_line(), usize::MAX);
        assert_eq!(forecast.forecast.len(), MAX_FORECAST_MONTHS);
        assert!(forecast.forecast.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(
            forecast.forecast.last().unwrap().date,
            make_date(2125, 3, 1)
        );
    }

    #[test]
    fn input_order_does_not_matter() {
        let mut reversed = daily_line();
        reversed.reverse();
        let service = ForecastService::new();
        assert_eq!(service.generate(&daily_line(), 3), service.generate(&reversed, 3));
    }

    #[test]
    fn single_point_projects_zero() {
        let forecast =
            ForecastService::new().generate(&[DataPoint::new(make_date(2025, 1, 10), 400.0)], 2);
        let model = forecast.model.unwrap();
        assert!(model.is_degenerate());
        assert!(forecast.forecast.iter().all(|p| p.value == 0.0));
        assert_eq!(forecast.forecast[0].date, make_date(2025, 2, 1));
    }

    #[test]
    fn values_are_whole_numbers() {
        let history = vec![
            DataPoint::new(make_date(2025, 1, 1), 100.3),
            DataPoint::new(make_date(2025, 2, 1), 211.7),
            DataPoint::new(make_date(2025, 3, 1), 290.1),
        ];
        let forecast = ForecastService::new().generate(&history, 3);
        assert!(forecast.forecast.iter().all(|p| p.value.fract() == 0.0));
    }

    #[test]
    fn spending_forecast_rising_series() {
        let monthly = vec![
            DataPoint::new(make_date(2025, 1, 1), 100.0),
            DataPoint::new(make_date(2025, 2, 1), 200.0),
            DataPoint::new(make_date(2025, 3, 1), 300.0),
        ];
        let sf = ForecastService::new().spending_forecast(&monthly, 3);
        assert_eq!(sf.trend, SpendingTrend::Increasing);
        assert_eq!(sf.average_monthly_spend, 200.0);
        assert_eq!(sf.points.len(), 6);
        assert!(sf.points[..3].iter().all(|p| p.kind == PointKind::Actual));
        assert!(sf.points[3..].iter().all(|p| p.kind == PointKind::Projected));
        assert_eq!(sf.next_month_estimate, sf.points[3].value);
        assert!(sf.next_month_estimate > 300.0);
    }

    #[test]
    fn spending_forecast_without_history_is_stable_zero() {
        let sf = ForecastService::new().spending_forecast(&[], 3);
        assert_eq!(sf.trend, SpendingTrend::Stable);
        assert_eq!(sf.next_month_estimate, 0.0);
        assert!(sf.points.is_empty());
    }
}

// ── CashFlowService ─────────────────────────────────────────────────

mod cash_flow_service {
    use super::*;

    #[test]
    fn sixty_ordered_points() {
        let points = CashFlowService::new().project(1000.0, &[], &[], today());
        assert_eq!(points.len(), 60);
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(points[0].date, today() - Duration::days(30));
        assert_eq!(points[29].date, today() - Duration::days(1));
        assert_eq!(points[30].date, today() + Duration::days(1));
        assert_eq!(points[59].date, today() + Duration::days(30));
        assert!(points[..30].iter().all(|p| !p.is_forecast));
        assert!(points[30..].iter().all(|p| p.is_forecast));
    }

    #[test]
    fn no_activity_is_flat() {
        let points = CashFlowService::new().project(1000.0, &[], &[], today());
        assert!(points.iter().all(|p| p.value == 1000.0));
    }

    #[test]
    fn history_walks_backward_from_current_balance() {
        let txs = vec![
            Transaction::new(200.0, today()),
            Transaction::new(-50.0, make_date(2025, 6, 10)),
        ];
        let points = CashFlowService::new().project(1000.0, &txs, &[], today());

        // Before today's +200 landed
        assert_eq!(value_on(&points, make_date(2025, 6, 14)), 800.0);
        assert_eq!(value_on(&points, make_date(2025, 6, 10)), 800.0);
        // Before the -50 on the 10th
        assert_eq!(value_on(&points, make_date(2025, 6, 9)), 850.0);
        assert_eq!(value_on(&points, make_date(2025, 5, 16)), 850.0);
    }

    #[test]
    fn projection_subtracts_average_burn() {
        let txs = vec![Transaction::new(-300.0, make_date(2025, 6, 1))];
        let points = CashFlowService::new().project(1000.0, &txs, &[], today());
        // 300 / 30 = 10 per day
        assert_eq!(value_on(&points, make_date(2025, 6, 16)), 990.0);
        assert_eq!(value_on(&points, make_date(2025, 7, 15)), 700.0);
    }

    #[test]
    fn income_does_not_reduce_burn() {
        let txs = vec![Transaction::new(3000.0, make_date(2025, 6, 1))];
        let points = CashFlowService::new().project(1000.0, &txs, &[], today());
        assert!(points[30..].iter().all(|p| p.value == 1000.0));
    }

    #[test]
    fn transactions_outside_window_are_ignored() {
        // Window is the 30 days ending today: 2025-05-17 ..= 2025-06-15
        let txs = vec![
            Transaction::new(-600.0, make_date(2025, 5, 16)),
            Transaction::new(-600.0, make_date(2025, 6, 20)),
        ];
        let points = CashFlowService::new().project(1000.0, &txs, &[], today());
        assert!(points.iter().all(|p| p.value == 1000.0));
    }

    #[test]
    fn subscription_billed_on_matching_day() {
        let subs = vec![
            Subscription::new("Streaming", 15.99, make_date(2025, 6, 20)),
            Subscription::new("Old gym", 40.0, make_date(2025, 6, 18)).cancelled(),
        ];
        let points = CashFlowService::new().project(1000.0, &[], &subs, today());
        assert_eq!(value_on(&points, make_date(2025, 6, 18)), 1000.0);
        assert_eq!(value_on(&points, make_date(2025, 6, 19)), 1000.0);
        assert_eq!(value_on(&points, make_date(2025, 6, 20)), 984.01);
        assert_eq!(value_on(&points, make_date(2025, 7, 15)), 984.01);
    }

    #[test]
    fn negative_subscription_amount_still_debits() {
        let subs = vec![Subscription::new("Music", -10.0, make_date(2025, 6, 16))];
        let points = CashFlowService::new().project(100.0, &[], &subs, today());
        assert_eq!(value_on(&points, make_date(2025, 6, 16)), 90.0);
    }

    #[test]
    fn lowest_point_finds_minimum() {
        let txs = vec![Transaction::new(-300.0, make_date(2025, 6, 1))];
        let points = CashFlowService::new().project(1000.0, &txs, &[], today());
        let low = CashFlowService::lowest_point(&points).unwrap();
        assert_eq!(low.date, make_date(2025, 7, 15));
        assert!(CashFlowService::lowest_point(&[]).is_none());
    }
}

// ── SafeSpendService ────────────────────────────────────────────────

mod safe_spend_service {
    use super::*;

    #[test]
    fn bills_exceeding_balance_floor_at_zero() {
        let metrics = SafeSpendService::default().compute(&SafeSpendInputs::new(500.0, 600.0, 10, 20.0));
        assert_eq!(metrics.safe_daily_limit, 0.0);
        assert_eq!(metrics.risk_level, RiskLevel::High);
    }

    #[test]
    fn payday_today_returns_full_available() {
        let metrics = SafeSpendService::default().compute(&SafeSpendInputs::new(500.0, 100.0, 0, 20.0));
        assert_eq!(metrics.safe_daily_limit, 400.0);
        assert_eq!(metrics.risk_level, RiskLevel::Low);
        assert_eq!(metrics.days_until_payday, 0);
    }

    #[test]
    fn negative_days_treated_as_payday_today() {
        let metrics = SafeSpendService::default().compute(&SafeSpendInputs::new(300.0, 0.0, -3, 10.0));
        assert_eq!(metrics.safe_daily_limit, 300.0);
    }

    #[test]
    fn divides_by_days_until_payday() {
        let metrics = SafeSpendService::default().compute(&SafeSpendInputs::new(1000.0, 200.0, 10, 20.0));
        assert_eq!(metrics.safe_daily_limit, 80.0);
        assert_eq!(metrics.risk_level, RiskLevel::Low);
    }

    #[test]
    fn medium_risk_below_average_spend() {
        let metrics = SafeSpendService::default().compute(&SafeSpendInputs::new(1000.0, 0.0, 100, 15.0));
        assert_eq!(metrics.safe_daily_limit, 10.0);
        assert_eq!(metrics.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn high_risk_below_half_average_spend() {
        let metrics = SafeSpendService::default().compute(&SafeSpendInputs::new(400.0, 0.0, 100, 10.0));
        assert_eq!(metrics.safe_daily_limit, 4.0);
        assert_eq!(metrics.risk_level, RiskLevel::High);
    }

    #[test]
    fn no_spending_history_is_low_risk() {
        let metrics = SafeSpendService::default().compute(&SafeSpendInputs::new(0.0, 0.0, 10, 0.0));
        assert_eq!(metrics.safe_daily_limit, 0.0);
        assert_eq!(metrics.risk_level, RiskLevel::Low);
    }

    #[test]
    fn reports_monthly_figures() {
        let metrics = SafeSpendService::new(6.0).compute(
            &SafeSpendInputs::new(1000.0, 0.0, 10, 20.0).with_monthly_income(2500.0),
        );
        assert_eq!(metrics.monthly_expenses, 600.0);
        assert_eq!(metrics.emergency_fund_estimate, 3600.0);
        assert_eq!(metrics.monthly_income, 2500.0);
    }

    #[test]
    fn emergency_fund_target_is_unrounded() {
        let target = SafeSpendService::new(3.0).emergency_fund_target(10.001);
        assert!((target - 900.09).abs() < 1e-9);
        let metrics =
            SafeSpendService::new(3.0).compute(&SafeSpendInputs::new(0.0, 0.0, 1, 10.001));
        assert_eq!(metrics.emergency_fund_estimate, 900.09);
    }

    #[test]
    fn default_metrics_are_zero() {
        let metrics = SafeSpendMetrics::default();
        assert_eq!(metrics.safe_daily_limit, 0.0);
        assert_eq!(metrics.risk_level, RiskLevel::Low);
    }

    #[test]
    fn trailing_average_counts_only_window_expenses() {
        let txs = vec![
            Transaction::new(-30.0, today()),
            Transaction::new(-60.0, today() - Duration::days(29)),
            Transaction::new(-500.0, today() - Duration::days(30)),
            Transaction::new(1000.0, today()),
        ];
        let avg = SafeSpendService::trailing_average_daily_spend(&txs, today(), 30);
        assert!((avg - 3.0).abs() < 1e-9);
        assert_eq!(SafeSpendService::trailing_average_daily_spend(&txs, today(), 0), 0.0);
    }
}

// ── BudgetService ───────────────────────────────────────────────────

mod budget_service {
    use super::*;

    fn monthly_food(amount: f64) -> Budget {
        Budget::new("food", amount, BudgetPeriod::Monthly, make_date(2025, 1, 1))
    }

    #[test]
    fn zero_limit_reports_zero_percent() {
        let txs = vec![expense(50.0, today(), "food")];
        let progress = BudgetService::new().progress(&monthly_food(0.0), &txs, today());
        assert_eq!(progress.percentage, 0.0);
        assert_eq!(progress.spent, 50.0);
        assert!(progress.is_over_budget);
    }

    #[test]
    fn overspend_caps_percentage_but_flags_over() {
        let txs = vec![
            expense(100.0, make_date(2025, 6, 2), "food"),
            expense(50.0, make_date(2025, 6, 9), "food"),
        ];
        let progress = BudgetService::new().progress(&monthly_food(100.0), &txs, today());
        assert_eq!(progress.spent, 150.0);
        assert_eq!(progress.percentage, 100.0);
        assert_eq!(progress.remaining, -50.0);
        assert!(progress.is_over_budget);
    }

    #[test]
    fn partial_consumption() {
        let txs = vec![expense(25.0, make_date(2025, 6, 3), "food")];
        let progress = BudgetService::new().progress(&monthly_food(100.0), &txs, today());
        assert_eq!(progress.percentage, 25.0);
        assert_eq!(progress.remaining, 75.0);
        assert!(!progress.is_over_budget);
    }

    #[test]
    fn exactly_at_limit_is_not_over() {
        let txs = vec![expense(100.0, make_date(2025, 6, 3), "food")];
        let progress = BudgetService::new().progress(&monthly_food(100.0), &txs, today());
        assert_eq!(progress.percentage, 100.0);
        assert!(!progress.is_over_budget);
    }

    #[test]
    fn only_current_window_counts() {
        let txs = vec![
            expense(40.0, make_date(2025, 6, 1), "food"),
            expense(70.0, make_date(2025, 5, 31), "food"),
        ];
        let progress = BudgetService::new().progress(&monthly_food(100.0), &txs, today());
        assert_eq!(progress.spent, 40.0);
        assert_eq!(progress.window.start, make_date(2025, 6, 1));
        assert_eq!(progress.window.end, make_date(2025, 6, 30));
    }

    #[test]
    fn ledger_filtering_by_category_and_sign() {
        let ledger = vec![
            expense(10.0, today(), "Food"),
            expense(99.0, today(), "travel"),
            Transaction::new(500.0, today()).with_category("food"),
            Transaction::new(-5.0, today()),
        ];
        let relevant = BudgetService::expense_transactions_for(&monthly_food(100.0), &ledger);
        assert_eq!(relevant.len(), 1);
        assert_eq!(relevant[0].amount, -10.0);
    }

    #[test]
    fn progress_all_covers_every_budget() {
        let budgets = vec![
            monthly_food(100.0),
            Budget::new("travel", 50.0, BudgetPeriod::Weekly, make_date(2025, 1, 6)),
        ];
        let ledger = vec![
            expense(30.0, today(), "food"),
            expense(80.0, today(), "travel"),
        ];
        let all = BudgetService::new().progress_all(&budgets, &ledger, today());
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].spent, 30.0);
        assert!(!all[0].is_over_budget);
        assert_eq!(all[1].spent, 80.0);
        assert!(all[1].is_over_budget);
    }
}

// ── SummaryService ──────────────────────────────────────────────────

mod summary_service {
    use super::*;

    #[test]
    fn summarize_window_totals() {
        let txs = vec![
            Transaction::new(2000.0, make_date(2025, 6, 1)),
            expense(300.0, make_date(2025, 6, 2), "Groceries"),
            expense(200.0, make_date(2025, 6, 3), "dining"),
            Transaction::new(-100.0, make_date(2025, 6, 4)),
            expense(999.0, make_date(2025, 4, 1), "groceries"),
        ];
        let summary =
            SummaryService::new().summarize(&Account::new(1000.0, "usd"), &txs, today(), 30, 2);
        assert_eq!(summary.balance, 1000.0);
        assert_eq!(summary.currency, "USD");
        assert_eq!(summary.income, 2000.0);
        assert_eq!(summary.expenses, 600.0);
        assert_eq!(summary.net, 1400.0);
        assert_eq!(summary.savings_rate, 70.0);
        assert_eq!(summary.transaction_count, 4);
        assert_eq!(
            summary.top_categories,
            vec![
                CategorySpend { category: "groceries".into(), total: 300.0 },
                CategorySpend { category: "dining".into(), total: 200.0 },
            ]
        );
    }

    #[test]
    fn uncategorized_bucket() {
        let txs = vec![Transaction::new(-40.0, today())];
        let summary = SummaryService::new().summarize(&Account::default(), &txs, today(), 30, 5);
        assert_eq!(summary.top_categories[0].category, "uncategorized");
        assert_eq!(summary.savings_rate, 0.0);
    }

    #[test]
    fn monthly_series_uses_complete_months() {
        let txs = vec![
            Transaction::new(-500.0, make_date(2025, 2, 10)),
            Transaction::new(1000.0, make_date(2025, 3, 3)),
            Transaction::new(-100.0, make_date(2025, 4, 10)),
            Transaction::new(-50.0, make_date(2025, 4, 20)),
            Transaction::new(-200.0, make_date(2025, 5, 5)),
            Transaction::new(-999.0, make_date(2025, 6, 1)),
        ];
        let series = SummaryService::new().monthly_expense_series(&txs, today(), 3);
        assert_eq!(
            series,
            vec![
                DataPoint::new(make_date(2025, 3, 1), 0.0),
                DataPoint::new(make_date(2025, 4, 1), 150.0),
                DataPoint::new(make_date(2025, 5, 1), 200.0),
            ]
        );
    }

    #[test]
    fn monthly_series_empty_without_activity() {
        let series = SummaryService::new().monthly_expense_series(&[], today(), 6);
        assert!(series.is_empty());
    }

    #[test]
    fn detects_monthly_subscription() {
        let txs = vec![
            charge(15.99, make_date(2025, 1, 5), "NETFLIX.COM 866-579"),
            charge(15.99, make_date(2025, 2, 5), "Netflix.com"),
            charge(15.99, make_date(2025, 3, 5), "NETFLIX.COM"),
            charge(15.99, make_date(2025, 4, 5), "netflix.com 123"),
        ];
        let found = SummaryService::new().detect_recurring(&txs);
        assert_eq!(found.len(), 1);
        let netflix = &found[0];
        assert_eq!(netflix.merchant, "netflix com");
        assert_eq!(netflix.frequency, RecurrenceFrequency::Monthly);
        assert_eq!(netflix.occurrences, 4);
        assert_eq!(netflix.amount, 15.99);
        assert_eq!(netflix.first_seen, make_date(2025, 1, 5));
        assert_eq!(netflix.next_expected, make_date(2025, 5, 5));
    }

    #[test]
    fn detects_weekly_charge() {
        let txs: Vec<Transaction> = (0..4)
            .map(|i| charge(12.0, make_date(2025, 5, 1) + Duration::days(7 * i), "Climbing Gym"))
            .collect();
        let found = SummaryService::new().detect_recurring(&txs);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].frequency, RecurrenceFrequency::Weekly);
    }

    #[test]
    fn ignores_irregular_or_sparse_charges() {
        let txs = vec![
            // amounts vary too much
            charge(10.0, make_date(2025, 1, 1), "Cafe"),
            charge(25.0, make_date(2025, 2, 1), "Cafe"),
            charge(10.0, make_date(2025, 3, 1), "Cafe"),
            // only two occurrences
            charge(9.99, make_date(2025, 1, 10), "Music"),
            charge(9.99, make_date(2025, 2, 10), "Music"),
        ];
        assert!(SummaryService::new().detect_recurring(&txs).is_empty());
    }

    #[test]
    fn merchant_normalization() {
        assert_eq!(normalize_merchant("NETFLIX.COM 866-579"), "netflix com");
        assert_eq!(normalize_merchant("  Spotify   AB "), "spotify ab");
        assert_eq!(normalize_merchant("1234"), "");
    }

    fn totals(income: f64, expenses: f64) -> CashTotals {
        CashTotals { income, expenses }
    }

    #[test]
    fn health_score_components() {
        let score = SummaryService::new().health_score(&totals(1000.0, 900.0), 500.0, &[], 1000.0);
        assert_eq!(score.savings, 20);
        assert_eq!(score.budget_adherence, 15);
        assert_eq!(score.emergency_cushion, 15);
        assert_eq!(score.overall, 50);
    }

    #[test]
    fn health_score_caps_and_budgets() {
        let budgets = BudgetService::new().progress_all(
            &[
                Budget::new("food", 100.0, BudgetPeriod::Monthly, make_date(2025, 1, 1)),
                Budget::new("fun", 10.0, BudgetPeriod::Monthly, make_date(2025, 1, 1)),
            ],
            &[expense(50.0, today(), "fun")],
            today(),
        );
        let score =
            SummaryService::new().health_score(&totals(1000.0, 550.0), 5000.0, &budgets, 1000.0);
        assert_eq!(score.savings, 40);
        assert_eq!(score.budget_adherence, 15);
        assert_eq!(score.emergency_cushion, 30);
        assert_eq!(score.overall, 85);
    }

    #[test]
    fn health_score_without_target() {
        let service = SummaryService::new();
        assert_eq!(service.health_score(&totals(0.0, 0.0), 1.0, &[], 0.0).emergency_cushion, 30);
        let score = service.health_score(&totals(100.0, 150.0), -10.0, &[], 0.0);
        assert_eq!(score.emergency_cushion, 0);
        assert_eq!(score.savings, 0);
    }

    #[test]
    fn health_score_uses_unrounded_savings_rate() {
        // Savings rate 0.2451%: the summary shows 0.25, which would score 1 point.
        let raw = totals(10_000.0, 9_975.49);
        let summary = SummaryService::new().summarize(
            &Account::default(),
            &[
                Transaction::new(10_000.0, today()),
                Transaction::new(-9_975.49, today()),
            ],
            today(),
            30,
            5,
        );
        assert_eq!(summary.savings_rate, 0.25);
        let score = SummaryService::new().health_score(&raw, 0.0, &[], 0.0);
        assert_eq!(score.savings, 0);
    }

    #[test]
    fn window_totals_are_raw() {
        let txs = vec![
            Transaction::new(100.004, today()),
            Transaction::new(-20.001, today()),
            Transaction::new(-999.0, today() - Duration::days(30)),
        ];
        let t = SummaryService::new().window_totals(&txs, today(), 30);
        assert_eq!(t.income, 100.004);
        assert_eq!(t.expenses, 20.001);
        assert!((t.net() - 80.003).abs() < 1e-9);
    }

    #[test]
    fn huge_window_does_not_overflow() {
        let txs = vec![Transaction::new(-10.0, make_date(1900, 1, 1))];
        let summary =
            SummaryService::new().summarize(&Account::default(), &txs, today(), i64::MAX, 5);
        assert_eq!(summary.expenses, 10.0);
        let avg = SafeSpendService::trailing_average_daily_spend(&txs, today(), i64::MAX);
        assert!(avg >= 0.0 && avg.is_finite());
    }
}

// ── AnalysisService ─────────────────────────────────────────────────

mod analysis_service {
    use super::*;

    fn sample_context() -> FinancialContext {
        let budgets = BudgetService::new().progress_all(
            &[Budget::new("Food", 100.0, BudgetPeriod::Monthly, make_date(2025, 1, 1))],
            &[expense(60.0, today(), "food")],
            today(),
        );
        let cash_flow = CashFlowService::new().project(
            100.0,
            &[Transaction::new(-150.0, make_date(2025, 6, 1))],
            &[],
            today(),
        );
        FinancialContext {
            user_id: "u1".into(),
            as_of: Some(today()),
            summary: FinancialSummary {
                balance: 100.0,
                top_categories: vec![CategorySpend { category: "food".into(), total: 60.0 }],
                ..FinancialSummary::default()
            },
            budgets,
            cash_flow,
            safe_spend: SafeSpendMetrics {
                safe_daily_limit: 25.0,
                ..SafeSpendMetrics::default()
            },
            ..FinancialContext::default()
        }
    }

    #[test]
    fn spending_review_focus() {
        let ctx = sample_context();
        let payload = AnalysisService::new().prepare(
            &AnalysisRequest::SpendingReview { focus_category: Some("FOOD".into()) },
            &ctx,
        );
        match payload {
            AnalysisPayload::SpendingReview { summary, focus, .. } => {
                assert_eq!(summary.balance, 100.0);
                assert_eq!(focus.unwrap().total, 60.0);
            }
            other => panic!("Expected SpendingReview, got {other:?}"),
        }
    }

    #[test]
    fn budget_check_finds_category() {
        let ctx = sample_context();
        let service = AnalysisService::new();
        match service.prepare(&AnalysisRequest::BudgetCheck { category: "food".into() }, &ctx) {
            AnalysisPayload::BudgetCheck { progress, .. } => {
                assert_eq!(progress.unwrap().spent, 60.0);
            }
            other => panic!("Expected BudgetCheck, got {other:?}"),
        }
        match service.prepare(&AnalysisRequest::BudgetCheck { category: "rent".into() }, &ctx) {
            AnalysisPayload::BudgetCheck { progress, .. } => assert!(progress.is_none()),
            other => panic!("Expected BudgetCheck, got {other:?}"),
        }
    }

    #[test]
    fn cash_flow_outlook_uses_projection_only() {
        let ctx = sample_context();
        let payload = AnalysisService::new().prepare(
            &AnalysisRequest::CashFlowOutlook { low_balance_threshold: 0.0 },
            &ctx,
        );
        match payload {
            AnalysisPayload::CashFlowOutlook {
                projection,
                lowest_balance,
                lowest_balance_date,
                days_below_threshold,
            } => {
                assert_eq!(projection.len(), 30);
                assert!(projection.iter().all(|p| p.is_forecast));
                // 150 / 30 = 5 per day from 100
                assert_eq!(lowest_balance, -50.0);
                assert_eq!(lowest_balance_date, Some(make_date(2025, 7, 15)));
                assert_eq!(days_below_threshold, 10);
            }
            other => panic!("Expected CashFlowOutlook, got {other:?}"),
        }
    }

    #[test]
    fn cash_flow_outlook_without_projection_falls_back_to_balance() {
        let ctx = FinancialContext {
            summary: FinancialSummary { balance: 42.0, ..FinancialSummary::default() },
            ..FinancialContext::default()
        };
        match AnalysisService::new()
            .prepare(&AnalysisRequest::CashFlowOutlook { low_balance_threshold: 10.0 }, &ctx)
        {
            AnalysisPayload::CashFlowOutlook { lowest_balance, lowest_balance_date, .. } => {
                assert_eq!(lowest_balance, 42.0);
                assert!(lowest_balance_date.is_none());
            }
            other => panic!("Expected CashFlowOutlook, got {other:?}"),
        }
    }

    #[test]
    fn safe_to_spend_purchase_check() {
        let ctx = sample_context();
        let service = AnalysisService::new();
        let fits = |amount: Option<f64>| match service
            .prepare(&AnalysisRequest::SafeToSpend { planned_purchase: amount }, &ctx)
        {
            AnalysisPayload::SafeToSpend { purchase_fits, .. } => purchase_fits,
            other => panic!("Expected SafeToSpend, got {other:?}"),
        };
        assert_eq!(fits(Some(20.0)), Some(true));
        assert_eq!(fits(Some(25.0)), Some(true));
        assert_eq!(fits(Some(-30.0)), Some(false));
        assert_eq!(fits(None), None);
    }

    #[test]
    fn request_serializes_with_kind_tag() {
        let json = serde_json::to_value(AnalysisRequest::BudgetCheck { category: "food".into() }).unwrap();
        assert_eq!(json["kind"], "budget_check");
        assert_eq!(json["category"], "food");
    }
}
