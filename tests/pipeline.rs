use chrono::{NaiveDate, NaiveTime};
use mkoba_sms::{
    aggregate, classify, parse_message, MemberAction, MemberTransaction, MessageShape,
    ParseFailure, ParsedTransaction, RawMessage,
};
use pretty_assertions::assert_eq;

const SHARE_PURCHASE: &str = "255755959291(OBED SANGA) has purchased shares worth of TZS.20,000.00 from KIZPART SACCOS group on 27/11/2025 at 10:27";
const SOCIAL_PAYMENT: &str = "CKR4LDS51MY Confirmed.You successfully paid TZS.1,000.0 for a social of KIZPART SACCOS group on 27/11/2025 at 07:30";
const LOAN: &str = "CKO9LC170LH Confirmed.A development loan of TZS.350,000.00 has been transfered from KIZPART SACCOS group to 255755959291(OBED SANGA) on 2025-11-27 at 14:05:31. New account balance is TZS.1,250,000.00";

#[test]
fn member_transaction_end_to_end() {
    assert_eq!(classify(SHARE_PURCHASE), MessageShape::MemberTransaction);

    let message = RawMessage::new(SHARE_PURCHASE, "M-KOBA", 1_764_228_420_000);
    let tx = parse_message(&message).expect("member transaction");
    assert_eq!(
        tx,
        ParsedTransaction::MemberTransaction(MemberTransaction {
            phone: "255755959291".into(),
            member_name: "OBED SANGA".into(),
            action: MemberAction::PurchasedShares,
            amount_minor: 2_000_000,
            transaction_type: None,
            group_name: "KIZPART SACCOS group".into(),
            date: NaiveDate::from_ymd_opt(2025, 11, 27).unwrap(),
            time: NaiveTime::from_hms_opt(10, 27, 0).unwrap(),
            source: message.clone(),
        })
    );
}

#[test]
fn personal_confirmation_end_to_end() {
    assert_eq!(classify(SOCIAL_PAYMENT), MessageShape::PersonalConfirmation);

    let tx = parse_message(&RawMessage::new(SOCIAL_PAYMENT, "M-KOBA", 0)).expect("confirmation");
    assert_eq!(tx.shape(), MessageShape::PersonalConfirmation);
    assert_eq!(tx.amount_minor(), 100_000);
    assert_eq!(tx.date(), NaiveDate::from_ymd_opt(2025, 11, 27).unwrap());
}

#[test]
fn loan_wins_over_generic_confirmation() {
    assert_eq!(classify(LOAN), MessageShape::LoanDisbursement);

    let tx = parse_message(&RawMessage::new(LOAN, "M-KOBA", 0)).expect("loan");
    match tx {
        ParsedTransaction::LoanDisbursement(loan) => {
            assert_eq!(loan.reference, "CKO9LC170LH");
            assert_eq!(loan.loan_type, "development");
            assert_eq!(loan.amount_minor, 35_000_000);
            assert_eq!(loan.account_balance_minor, 125_000_000);
        }
        other => panic!("expected loan disbursement, got {:?}", other),
    }
}

#[test]
fn classified_but_malformed_is_reported_distinctly() {
    let message = RawMessage::new(
        "255755959291(OBED SANGA) has paid TZS.1,000.00 for a social of KIZPART SACCOS group on 29/02/2025 at 10:27",
        "M-KOBA",
        0,
    );
    let failure = parse_message(&message).unwrap_err();
    assert!(matches!(
        failure,
        ParseFailure::Normalization { shape: MessageShape::MemberTransaction, field: "date", .. }
    ));
    assert_eq!(failure.message(), &message);
}

#[test]
fn batch_counts_add_up() {
    let mut messages = Vec::new();
    for i in 0..10 {
        messages.push(RawMessage::new(SHARE_PURCHASE, "M-KOBA", i));
        messages.push(RawMessage::new(SOCIAL_PAYMENT, "M-KOBA", i));
        messages.push(RawMessage::new(LOAN, "M-KOBA", i));
    }
    let unrecognized = 7;
    for i in 0..unrecognized {
        messages.push(RawMessage::new(format!("Salio lako ni TZS.{}.00", i), "M-PESA", i));
    }

    let stats = aggregate::process(&messages);
    let per_shape: usize = MessageShape::PARSED.iter().map(|s| stats.count(*s)).sum();

    assert_eq!(stats.count(MessageShape::Unrecognized), unrecognized as usize);
    assert_eq!(per_shape + unrecognized as usize, messages.len());
    assert_eq!(stats.total_amount_minor, 10 * (2_000_000 + 100_000 + 35_000_000));
    assert_eq!(aggregate::process_parallel(&messages), stats);
}
