//! End-to-end platform flow: registration with referrals, a deposit with
//! commission fan-out, staking through a full accrual day, withdrawal holds
//! and a snapshot rebuild.

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use meridian::{
    AccountId, Amount, BalanceBucket, EntryFilter, EntryKind, EntryStatus, ExternalRef, Platform,
    PlatformError, Tier,
};

/// Monday 2025-06-02, a trading day for every tier
fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
}

fn day0() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn available(platform: &Platform, account: AccountId) -> Amount {
    platform.balance(account).unwrap().available
}

#[tokio::test]
async fn full_platform_lifecycle() -> Result<()> {
    let platform = Platform::new()?;

    // Registration chain: root <- alice <- bob.
    let root = platform.register_user(None, t0())?;
    let alice = platform.register_user(Some(root), t0())?;
    let bob = platform.register_user(Some(alice), t0())?;

    // Bob's first deposit pays his upline 10% and 5%.
    let outcome = platform.confirm_deposit(bob, 20_000, ExternalRef::new("tx-001"), t0())?;
    assert!(outcome.commissions.qualified);
    assert!(outcome.commissions.failures.is_empty());
    assert_eq!(outcome.commissions.credited.len(), 2);
    assert_eq!(available(&platform, bob), 20_000);
    assert_eq!(available(&platform, alice), 2_000);
    assert_eq!(available(&platform, root), 1_000);

    // Commission entries trace back to the deposit.
    let filter = EntryFilter {
        kind: Some(EntryKind::ReferralCommission),
        status: Some(EntryStatus::Completed),
        since: None,
    };
    for entry in platform.transactions(alice, &filter)? {
        assert_eq!(entry.related_entry_id, Some(outcome.entry.id));
    }

    let stats = platform.referral_stats(root)?;
    assert_eq!(stats.network, vec![1, 1]);
    assert_eq!(stats.total_commission, 1_000);

    // Bob stakes half into the entry tier.
    let position = platform.open_stake(bob, Tier::Anchor, 10_000, t0())?;
    let balance = platform.balance(bob)?;
    assert_eq!(balance.available, 10_000);
    assert_eq!(balance.locked, 10_000);

    // First accrual run credits the deterministic daily draw for
    // position 1 on 2025-06-02 (76 bps of 10_000).
    let run = platform.run_accrual(day0(), t0() + Duration::hours(1)).await?;
    assert_eq!(run.credited, 1);
    assert!(run.failures.is_empty());
    assert_eq!(available(&platform, bob), 10_076);

    // A redundant trigger for the same day is a no-op.
    let rerun = platform.run_accrual(day0(), t0() + Duration::hours(2)).await?;
    assert_eq!(rerun.credited, 0);
    assert_eq!(rerun.already_accrued, 1);
    assert_eq!(available(&platform, bob), 10_076);

    // Fresh ROI is held back from withdrawal for 24 hours.
    let now = t0() + Duration::hours(3);
    assert_eq!(platform.withdrawable(bob, now)?, 10_000);
    assert_eq!(platform.withdrawable(bob, now + Duration::days(2))?, 10_076);

    // Saturday is off-calendar for the entry tier.
    let saturday = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
    let weekend = platform.run_accrual(saturday, t0() + Duration::days(5)).await?;
    assert_eq!(weekend.credited, 0);
    assert_eq!(weekend.skipped, 1);
    assert_eq!(available(&platform, bob), 10_076);

    // Principal stays locked until the 30-day clock runs out.
    let early = platform.close_stake(position.id, t0() + Duration::days(5));
    assert!(matches!(early, Err(PlatformError::Stake(_))));

    let unlocked = t0() + Duration::days(31);
    platform.close_stake(position.id, unlocked)?;
    let balance = platform.balance(bob)?;
    assert_eq!(balance.available, 20_076);
    assert_eq!(balance.locked, 0);

    // Withdrawal hold: reject releases it, confirm settles it.
    let request = platform.request_withdrawal(bob, 5_000, ExternalRef::new("wd-001"), unlocked)?;
    let held = platform.balance(bob)?;
    assert_eq!(held.available, 15_076);
    assert_eq!(held.pending, 5_000);

    platform.reject_withdrawal_request(request.id, unlocked + Duration::hours(1))?;
    assert_eq!(available(&platform, bob), 20_076);
    assert_eq!(platform.balance(bob)?.pending, 0);

    let request = platform.request_withdrawal(bob, 5_000, ExternalRef::new("wd-002"), unlocked)?;
    platform.confirm_withdrawal_request(request.id)?;
    let settled = platform.balance(bob)?;
    assert_eq!(settled.available, 15_076);
    assert_eq!(settled.pending, 0);

    // Every balance above survives a from-scratch replay of the log.
    platform.rebuild()?;
    assert_eq!(available(&platform, bob), 15_076);
    assert_eq!(available(&platform, alice), 2_000);
    assert_eq!(available(&platform, root), 1_000);

    Ok(())
}

#[tokio::test]
async fn second_deposit_pays_no_commission_by_default() -> Result<()> {
    let platform = Platform::new()?;
    let root = platform.register_user(None, t0())?;
    let user = platform.register_user(Some(root), t0())?;

    platform.confirm_deposit(user, 1_000, ExternalRef::new("tx-1"), t0())?;
    let outcome = platform.confirm_deposit(user, 9_000, ExternalRef::new("tx-2"), t0())?;

    assert!(!outcome.commissions.qualified);
    assert!(outcome.commissions.credited.is_empty());
    assert_eq!(available(&platform, root), 100);
    Ok(())
}

#[test]
fn registration_rejects_unknown_referrers() {
    let platform = Platform::new().unwrap();
    let ghost = AccountId::new(404);
    let err = platform.register_user(Some(ghost), t0()).unwrap_err();
    assert!(matches!(err, PlatformError::Ledger(_)));
}

#[test]
fn admin_adjustment_shows_up_in_the_log() -> Result<()> {
    let platform = Platform::new()?;
    let user = platform.register_user(None, t0())?;
    platform.confirm_deposit(user, 500, ExternalRef::new("tx-1"), t0())?;

    platform.admin_adjust(
        user,
        -200,
        BalanceBucket::Available,
        ExternalRef::new("support-ticket-88"),
        t0(),
    )?;
    assert_eq!(available(&platform, user), 300);

    let filter = EntryFilter {
        kind: Some(EntryKind::AdminAdjustment),
        status: None,
        since: None,
    };
    assert_eq!(platform.transactions(user, &filter)?.len(), 1);
    Ok(())
}

#[test]
fn referral_stats_serialize_for_api_responses() -> Result<()> {
    let platform = Platform::new()?;
    let root = platform.register_user(None, t0())?;
    platform.register_user(Some(root), t0())?;

    let stats = platform.referral_stats(root)?;
    let json = serde_json::to_value(&stats)?;
    assert_eq!(json["network"], serde_json::json!([1]));
    Ok(())
}
