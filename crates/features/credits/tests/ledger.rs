use lvai_credits::{Credits, CreditsError, LedgerEntry, init};
use lvai_database::Database;
use lvai_domain::credits::{ReferenceType, TransactionType};
use lvai_identity::{UserRecord, UserRepository};
use lvai_kernel::pagination::PageRequest;

async fn setup(initial: i64) -> (Credits, String) {
    let db = Database::builder().url("mem://").session("test", "credits").init().await.unwrap();
    let user = UserRepository::new(db.clone())
        .create(
            UserRecord::new("eve@example.com".into(), "eve".into(), "hash".into(), None, 1),
            initial,
        )
        .await
        .unwrap();
    let credits = init(&db).downcast_ref::<Credits>().unwrap().clone();
    (credits, user.uid)
}

#[tokio::test]
async fn credit_and_debit_keep_the_ledger_consistent() {
    let (credits, user) = setup(100).await;
    let ledger = &credits.ledger;

    let balance = ledger
        .credit(&user, 550, LedgerEntry::new(TransactionType::Purchase).reference(ReferenceType::CreditPackage, "standard"))
        .await
        .unwrap();
    assert_eq!(balance, 650);

    let balance = ledger
        .debit(&user, 30, LedgerEntry::new(TransactionType::Recommendation).description("3 picks"))
        .await
        .unwrap();
    assert_eq!(balance, 620);
    assert_eq!(ledger.balance(&user).await.unwrap(), Some(620));

    let (entries, total) = ledger.transactions(&user, None, PageRequest::new(None, None).unwrap()).await.unwrap();
    assert_eq!(total, 3);
    for entry in &entries {
        assert_eq!(entry.balance_after, entry.balance_before + entry.amount);
    }

    let (purchases, total) = ledger
        .transactions(&user, Some(TransactionType::Purchase), PageRequest::new(None, None).unwrap())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(purchases[0].reference_type.as_deref(), Some("credit_package"));
    assert_eq!(purchases[0].reference_id.as_deref(), Some("standard"));

    let summary = ledger.summary(&user).await.unwrap();
    assert_eq!((summary.income, summary.expense, summary.recommendations), (650, 30, 1));
}

#[tokio::test]
async fn debit_never_goes_negative() {
    let (credits, user) = setup(20).await;

    let err = credits
        .ledger
        .debit(&user, 30, LedgerEntry::new(TransactionType::Recommendation))
        .await
        .unwrap_err();
    assert!(matches!(err, CreditsError::InsufficientCredits { required: 30, available: 20 }));
    assert_eq!(credits.ledger.balance(&user).await.unwrap(), Some(20));

    assert_eq!(
        credits.ledger.debit(&user, 20, LedgerEntry::new(TransactionType::Recommendation)).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn amounts_must_be_positive_and_users_known() {
    let (credits, user) = setup(0).await;
    let entry = || LedgerEntry::new(TransactionType::Admin);

    assert!(matches!(
        credits.ledger.credit(&user, 0, entry()).await,
        Err(CreditsError::InvalidAmount { amount: 0 })
    ));
    assert!(matches!(
        credits.ledger.debit(&user, -5, entry()).await,
        Err(CreditsError::InvalidAmount { .. })
    ));
    assert!(matches!(
        credits.ledger.credit("nobody", 10, entry()).await,
        Err(CreditsError::UserNotFound { .. })
    ));
    assert!(matches!(
        credits.ledger.debit("nobody", 10, entry()).await,
        Err(CreditsError::UserNotFound { .. })
    ));

    let summary = credits.ledger.summary(&user).await.unwrap();
    assert_eq!((summary.income, summary.expense, summary.recommendations), (0, 0, 0));
}

#[tokio::test]
async fn seeded_packages_are_listed_in_order() {
    let (credits, _) = setup(0).await;

    let packages = credits.packages.active().await.unwrap();
    assert_eq!(packages.iter().map(|p| p.uid.as_str()).collect::<Vec<_>>(), ["starter", "standard", "premium"]);
    assert_eq!(packages[2].total_credits(), 1400);

    assert!(credits.packages.find_active("standard").await.unwrap().is_some());
    assert!(credits.packages.find_active("platinum").await.unwrap().is_none());
}
