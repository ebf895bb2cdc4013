use chrono::NaiveDate;
use installment_ledger::application::ledger::Ledger;
use installment_ledger::domain::account::{Account, NewAccount};
use installment_ledger::domain::allocation::{allocation_order, PaymentMode};
use installment_ledger::domain::installment::Installment;
use installment_ledger::domain::money::{Amount, Money};
use installment_ledger::infrastructure::in_memory::InMemoryAccountRepository;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

const ROUNDS: usize = 200;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

/// A random amount in cents between 0.01 and `max_cents / 100`.
fn random_cents(rng: &mut StdRng, max_cents: i64) -> Decimal {
    Decimal::new(rng.gen_range(1..=max_cents), 2)
}

fn random_account(rng: &mut StdRng, id: &str) -> Account {
    let new = NewAccount {
        id: id.to_string(),
        name: "Ana".to_string(),
        cadence: ["monthly", "biweekly", ""]
            .choose(rng)
            .unwrap()
            .to_string(),
        product: "TV".to_string(),
        product_price: Money::new(random_cents(rng, 500_000) + Decimal::from(100)),
        installment_count: rng.gen_range(1..=12),
    };
    Account::open(new, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()).unwrap()
}

fn random_mode(rng: &mut StdRng) -> PaymentMode {
    if rng.gen_bool(0.3) {
        PaymentMode::CloseWithShortfall
    } else {
        PaymentMode::Partial
    }
}

fn assert_invariants(account: &Account) {
    assert!(account.carried_credit >= Money::ZERO);
    for installment in &account.installments {
        assert!(installment.paid_amount >= Money::ZERO);
        assert!(installment.paid_amount <= installment.original_amount);
        assert_eq!(installment.paid_date.is_some(), installment.is_paid());
    }
    let mut numbers: Vec<u32> = account.installments.iter().map(|i| i.number).collect();
    numbers.dedup();
    assert_eq!(numbers.len(), account.installments.len());
    assert!(numbers.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_schedule_sums_to_price() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..ROUNDS {
        let account = random_account(&mut rng, "1");
        let total: Money = account.installments.iter().map(|i| i.original_amount).sum();
        assert_eq!(total, account.product_price);
        assert_invariants(&account);
    }
}

#[test]
fn test_allocation_conserves_money() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..ROUNDS {
        let mut account = random_account(&mut rng, "1");
        for _ in 0..rng.gen_range(1..8) {
            let paid_before = account.total_paid();
            let credit_before = account.carried_credit;
            let amount = Money::new(random_cents(&mut rng, 300_000));
            let mode = random_mode(&mut rng);

            let outcome = account.apply_payment_with(amount, mode, today()).unwrap();

            assert_eq!(
                amount + paid_before + credit_before,
                account.total_paid() + account.carried_credit
            );
            assert_eq!(outcome.pool, amount + credit_before);
            assert_eq!(outcome.carried_credit, account.carried_credit);
            assert_invariants(&account);
        }
    }
}

#[test]
fn test_paid_installments_stay_paid() {
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..ROUNDS {
        let mut account = random_account(&mut rng, "1");
        for _ in 0..rng.gen_range(1..8) {
            let paid_before: Vec<(u32, Money)> = account
                .installments
                .iter()
                .filter(|i| i.is_paid())
                .map(|i| (i.number, i.paid_amount))
                .collect();

            let amount = Money::new(random_cents(&mut rng, 200_000));
            let mode = random_mode(&mut rng);
            account.apply_payment_with(amount, mode, today()).unwrap();

            for (number, paid) in paid_before {
                let installment = account
                    .installments
                    .iter()
                    .find(|i| i.number == number)
                    .unwrap();
                assert!(installment.is_paid());
                assert_eq!(installment.paid_amount, paid);
            }
        }
    }
}

#[test]
fn test_shortfall_never_spawns_shortfall() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..ROUNDS {
        let mut account = random_account(&mut rng, "1");
        for _ in 0..rng.gen_range(1..10) {
            let amount = Money::new(random_cents(&mut rng, 50_000));
            account.apply_payment_closing_short(amount, today()).unwrap();
        }
        let shortfalls = account.installments.iter().filter(|i| i.is_shortfall).count();
        let scheduled = account.installments.len() - shortfalls;
        assert!(shortfalls <= scheduled);
        assert_invariants(&account);
    }
}

#[test]
fn test_ordering_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(5);
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for _ in 0..ROUNDS {
        let mut installments: Vec<Installment> = (1..=rng.gen_range(2..10))
            .map(|number| {
                let due = if rng.gen_bool(0.2) {
                    None
                } else {
                    base.checked_add_days(chrono::Days::new(rng.gen_range(0..5) * 14))
                };
                let mut installment = Installment::new(number, Money::new(Decimal::from(10)), due);
                if rng.gen_bool(0.3) {
                    installment.apply_payment(Money::new(Decimal::from(10)), base);
                }
                installment
            })
            .collect();

        let mut shuffled = installments.clone();
        shuffled.shuffle(&mut rng);
        installments.sort_by(allocation_order);
        shuffled.sort_by(allocation_order);
        assert_eq!(installments, shuffled);
    }
}

#[test]
fn test_undo_restores_exact_state() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..20 {
        let mut ledger =
            Ledger::new(Box::new(InMemoryAccountRepository::new())).with_clock(today);
        let mut states = vec![ledger.accounts().to_vec()];

        for step in 0..rng.gen_range(5..25) {
            let ids: Vec<String> = ledger.accounts().iter().map(|a| a.id.clone()).collect();
            let applied = match rng.gen_range(0..10) {
                0..=2 => {
                    let account = random_account(&mut rng, &format!("acc-{step}"));
                    ledger.add_account(account).is_ok()
                }
                3 if !ids.is_empty() => {
                    let id = ids.choose(&mut rng).unwrap();
                    ledger.delete_account(id).is_ok()
                }
                _ if !ids.is_empty() => {
                    let id = ids.choose(&mut rng).unwrap();
                    let amount = Amount::new(random_cents(&mut rng, 200_000)).unwrap();
                    let mode = random_mode(&mut rng);
                    ledger.register_payment(id, amount, mode).is_ok()
                }
                _ => false,
            };
            if applied {
                states.push(ledger.accounts().to_vec());
            }
        }

        states.pop();
        while let Some(expected) = states.pop() {
            assert!(ledger.undo().unwrap().outcome.is_some());
            assert_eq!(ledger.accounts(), expected.as_slice());
        }
        assert!(ledger.undo().unwrap().outcome.is_none());
    }
}
