//! Contract tests for the in-memory stores.
//!
//! `ledger_store_tests!` generates a suite that any `LedgerStore`
//! implementation must pass: ordering, payment targeting, the overpayment
//! rule and serialized concurrent payments. `user_service_tests!` does the
//! same for `DataService<User>`.

use chrono::{Duration, NaiveDate, Utc};
use eduverse::config::LedgerConfig;
use eduverse::prelude::*;
use rust_decimal_macros::dec;

fn due() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 15).unwrap()
}

fn invoice_at(student: Uuid, amount: Decimal, minutes_ago: i64) -> Invoice {
    let mut invoice = Invoice::new(student, "Tuition", amount, due());
    invoice.created_at = Utc::now() - Duration::minutes(minutes_ago);
    invoice
}

fn cash(amount: Decimal) -> PaymentDraft {
    PaymentDraft::new(amount, PaymentMethod::Cash)
}

macro_rules! ledger_store_tests {
    ($factory:expr) => {
        mod ledger_store_contract_tests {
            use super::*;

            const STRICT: LedgerConfig = LedgerConfig {
                allow_overpayment: false,
            };

            #[tokio::test]
            async fn test_list_is_newest_first_and_scoped() {
                let store = $factory;
                let student = Uuid::new_v4();
                let old = store.create_invoice(invoice_at(student, dec!(10), 60)).await.unwrap();
                let new = store.create_invoice(invoice_at(student, dec!(20), 5)).await.unwrap();
                store
                    .create_invoice(invoice_at(Uuid::new_v4(), dec!(30), 1))
                    .await
                    .unwrap();

                let ids: Vec<Uuid> = store
                    .list_invoices(Some(&student))
                    .await
                    .unwrap()
                    .iter()
                    .map(|r| r.invoice.id)
                    .collect();
                assert_eq!(ids, vec![new.id, old.id]);
                assert_eq!(store.list_invoices(None).await.unwrap().len(), 3);
            }

            #[tokio::test]
            async fn test_duplicate_invoice_id_is_rejected() {
                let store = $factory;
                let invoice = invoice_at(Uuid::new_v4(), dec!(10), 0);
                store.create_invoice(invoice.clone()).await.unwrap();
                let err = store.create_invoice(invoice).await.unwrap_err();
                assert_eq!(err.error_code(), "ENTITY_ALREADY_EXISTS");
            }

            #[tokio::test]
            async fn test_student_target_skips_paid_invoices() {
                let store = $factory;
                let student = Uuid::new_v4();
                let older = store.create_invoice(invoice_at(student, dec!(50), 60)).await.unwrap();
                let newer = store.create_invoice(invoice_at(student, dec!(20), 5)).await.unwrap();

                let first = store
                    .record_payment(PaymentTarget::Student(student), cash(dec!(20)), STRICT)
                    .await
                    .unwrap();
                assert_eq!(first.invoice_id, newer.id);

                let second = store
                    .record_payment(PaymentTarget::Student(student), cash(dec!(5)), STRICT)
                    .await
                    .unwrap();
                assert_eq!(second.invoice_id, older.id);
            }

            #[tokio::test]
            async fn test_no_outstanding_invoice() {
                let store = $factory;
                let err = store
                    .record_payment(PaymentTarget::Student(Uuid::new_v4()), cash(dec!(1)), STRICT)
                    .await
                    .unwrap_err();
                assert_eq!(err.error_code(), "NO_OUTSTANDING_INVOICE");
            }

            #[tokio::test]
            async fn test_overpayment_rule() {
                let store = $factory;
                let invoice = store
                    .create_invoice(invoice_at(Uuid::new_v4(), dec!(10), 0))
                    .await
                    .unwrap();

                let err = store
                    .record_payment(PaymentTarget::Invoice(invoice.id), cash(dec!(10.01)), STRICT)
                    .await
                    .unwrap_err();
                assert_eq!(err.error_code(), "OVERPAYMENT");

                let lenient = LedgerConfig {
                    allow_overpayment: true,
                };
                store
                    .record_payment(PaymentTarget::Invoice(invoice.id), cash(dec!(10.01)), lenient)
                    .await
                    .unwrap();
                let record = store.get_invoice(&invoice.id).await.unwrap().unwrap();
                assert_eq!(record.status(), InvoiceStatus::Paid);
                assert_eq!(record.outstanding(), dec!(0));
            }

            #[tokio::test]
            async fn test_import_payment_keeps_fields() {
                let store = $factory;
                let invoice = store
                    .create_invoice(invoice_at(Uuid::new_v4(), dec!(10), 0))
                    .await
                    .unwrap();
                let payment = cash(dec!(4))
                    .with_transaction_id("TXN-7")
                    .into_payment(invoice.id);

                store
                    .import_payment(payment.clone(), LedgerConfig::default())
                    .await
                    .unwrap();
                assert!(
                    store
                        .import_payment(payment.clone(), LedgerConfig::default())
                        .await
                        .is_err()
                );

                let record = store.get_invoice(&invoice.id).await.unwrap().unwrap();
                assert_eq!(record.payments, vec![payment]);
                assert_eq!(record.status(), InvoiceStatus::Partial);
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn test_concurrent_payments_are_serialized() {
                let store = $factory;
                let invoice = store
                    .create_invoice(invoice_at(Uuid::new_v4(), dec!(100), 0))
                    .await
                    .unwrap();

                let invoice_id = invoice.id;
                let handles: Vec<_> = (0..16)
                    .map(|_| {
                        let store = store.clone();
                        tokio::spawn(async move {
                            store
                                .record_payment(PaymentTarget::Invoice(invoice_id), cash(dec!(7)), STRICT)
                                .await
                        })
                    })
                    .collect();
                for handle in handles {
                    let _ = handle.await.unwrap();
                }

                let record = store.get_invoice(&invoice.id).await.unwrap().unwrap();
                assert_eq!(record.payments.len(), 14);
                assert_eq!(record.amount_paid(), dec!(98));
            }
        }
    };
}

macro_rules! user_service_tests {
    ($factory:expr) => {
        mod user_service_contract_tests {
            use super::*;

            #[tokio::test]
            async fn test_crud_round() {
                let service = $factory;
                let user = service
                    .create(User::new("Emma Wilson", "emma@school.edu", Role::Student))
                    .await
                    .unwrap();

                let mut renamed = service.get(&user.id).await.unwrap().unwrap();
                renamed.name = "Emma W.".to_string();
                service.update(&user.id, renamed).await.unwrap();
                assert_eq!(service.get(&user.id).await.unwrap().unwrap().name, "Emma W.");

                assert!(service.delete(&user.id).await.unwrap().is_some());
                assert!(service.delete(&user.id).await.unwrap().is_none());
                assert!(service.list().await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_update_unknown_is_not_found() {
                let service = $factory;
                let user = User::new("Ghost", "ghost@school.edu", Role::Staff);
                let err = service.update(&user.id, user.clone()).await.unwrap_err();
                assert_eq!(err.error_code(), "ENTITY_NOT_FOUND");
            }

            #[tokio::test]
            async fn test_search_by_role_and_email() {
                let service = $factory;
                service
                    .create(User::new("Emma Wilson", "emma@school.edu", Role::Student))
                    .await
                    .unwrap();
                service
                    .create(User::new("Sarah Johnson", "sarah@school.edu", Role::Teacher))
                    .await
                    .unwrap();

                assert_eq!(service.search("role", "TEACHER").await.unwrap().len(), 1);
                assert_eq!(service.search("email", "emma@school.edu").await.unwrap().len(), 1);
                assert!(service.search("nickname", "em").await.unwrap().is_empty());
            }
        }
    };
}

ledger_store_tests!(InMemoryLedgerStore::new());
user_service_tests!(InMemoryDataService::<User>::new());
