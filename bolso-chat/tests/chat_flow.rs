//! End-to-end conversation tests against the in-memory store.

use chrono::{DateTime, TimeDelta, Utc};

use bolso_chat::{IncomingMessage, MemoryStore, MessageHandler};
use bolso_chat::store::FinanceStore;
use bolso_core::schedule::PaymentStatus;

const SENDER: &str = "5511999990000@c.us";

fn now() -> DateTime<Utc> {
    // 12:00 in São Paulo.
    DateTime::parse_from_rfc3339("2024-06-15T15:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn msg(id: u32, text: &str) -> IncomingMessage {
    IncomingMessage {
        sender: SENDER.to_string(),
        message_id: id.to_string(),
        push_name: Some("Ana".to_string()),
        text: text.to_string(),
    }
}

/// Fresh handler with a registered user holding the given balance.
fn handler_with_balance(balance: f64) -> MessageHandler<MemoryStore> {
    let mut handler = MessageHandler::new(MemoryStore::default());
    let replies = handler.handle(&msg(0, "oi"), now());
    assert!(replies[0].contains("Olá"), "first contact should be welcomed");
    let replies = handler.handle(&msg(1, &format!("/saldo {balance}")), now());
    assert!(replies[0].contains("SALDO DEFINIDO"));
    handler
}

fn user_id(handler: &MessageHandler<MemoryStore>) -> i64 {
    handler.store().user_by_contact(SENDER).unwrap().id
}

#[test]
fn natural_language_expense_is_recorded_and_categorized() {
    let mut handler = handler_with_balance(1000.0);

    let replies = handler.handle(&msg(2, "gastei 50 no mercado"), now());
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("GASTO REGISTRADO"));
    assert!(replies[0].contains("R$ 50,00"));
    assert!(replies[0].contains("mercado"));
    assert!(replies[0].contains("Alimentação"));
    assert!(replies[0].contains("R$ 950,00"));

    let user = handler.store().user_by_contact(SENDER).unwrap();
    assert_eq!(user.current_balance, 950.0);
}

#[test]
fn expense_without_initial_balance_is_refused() {
    let mut handler = MessageHandler::new(MemoryStore::default());
    handler.handle(&msg(0, "oi"), now());

    let replies = handler.handle(&msg(1, "gastei 50 no mercado"), now());
    assert!(replies[0].contains("Defina seu saldo inicial"));
}

#[test]
fn oversized_amount_is_invalid() {
    let mut handler = handler_with_balance(1000.0);
    let replies = handler.handle(&msg(2, "gastei 2000000 no mercado"), now());
    assert!(replies[0].contains("Valor inválido"));
}

#[test]
fn installment_purchase_creates_monthly_schedule() {
    let mut handler = handler_with_balance(5000.0);

    let replies = handler.handle(&msg(2, "comprei celular 1200 em 12x"), now());
    assert!(replies[0].contains("COMPRA PARCELADA REGISTRADA"));
    assert!(replies[0].contains("12x de R$ 100,00"));

    let uid = user_id(&handler);
    let installment = handler.store().find_installment(uid, "celular").unwrap();
    assert_eq!(installment.total_installments, 12);
    assert_eq!(installment.installment_amount, 100.0);

    let payments = handler.store().payments_for(installment.id);
    assert_eq!(payments.len(), 12);
    // Anchored on day 5 of the month after the purchase (June -> July).
    assert_eq!(payments[0].payment.due_date.to_string(), "2024-07-05");
    assert_eq!(payments[11].payment.due_date.to_string(), "2025-06-05");
    assert!(payments.iter().all(|p| p.payment.status == PaymentStatus::Pending));
}

#[test]
fn pay_installment_by_partial_description() {
    let mut handler = handler_with_balance(5000.0);
    handler.handle(&msg(2, "comprei notebook 3000 em 10x"), now());

    let replies = handler.handle(&msg(3, "/pagar notebook"), now());
    assert!(replies[0].contains("PARCELA PAGA"));
    assert!(replies[0].contains("parcela 1/10"));

    let user = handler.store().user_by_contact(SENDER).unwrap();
    assert_eq!(user.current_balance, 4700.0);

    // Next pending moved forward.
    let uid = user_id(&handler);
    let installment = handler.store().find_installment(uid, "notebook").unwrap();
    let next = handler.store().next_pending_payment(installment.id).unwrap();
    assert_eq!(next.payment.number, 2);
}

#[test]
fn paying_unknown_installment_reports_not_found() {
    let mut handler = handler_with_balance(1000.0);
    let replies = handler.handle(&msg(2, "/pagar geladeira"), now());
    assert!(replies[0].contains("Nenhum registro encontrado"));
}

#[test]
fn full_reset_requires_confirmation() {
    let mut handler = handler_with_balance(1000.0);
    handler.handle(&msg(2, "gastei 100 no mercado"), now());

    let replies = handler.handle(&msg(3, "/zerar tudo"), now());
    assert!(replies[0].contains("CONFIRMAÇÃO NECESSÁRIA"));

    // Balance untouched until confirmed.
    let user = handler.store().user_by_contact(SENDER).unwrap();
    assert_eq!(user.current_balance, 900.0);

    let replies = handler.handle(&msg(4, "SIM, ZERAR TUDO"), now());
    assert!(replies[0].contains("SISTEMA TOTALMENTE ZERADO"));

    let user = handler.store().user_by_contact(SENDER).unwrap();
    assert_eq!(user.current_balance, 0.0);
    assert_eq!(user.initial_balance, 0.0);
}

#[test]
fn repeating_the_guarded_command_also_confirms() {
    let mut handler = handler_with_balance(1000.0);

    handler.handle(&msg(2, "/zerar tudo"), now());
    let replies = handler.handle(&msg(3, "/zerar tudo"), now());
    assert!(replies[0].contains("SISTEMA TOTALMENTE ZERADO"));
}

#[test]
fn confirmation_expires_after_ttl() {
    let mut handler = handler_with_balance(1000.0);

    handler.handle(&msg(2, "/zerar tudo"), now());
    let late = now() + TimeDelta::seconds(121);
    let replies = handler.handle(&msg(3, "SIM, ZERAR TUDO"), late);
    assert!(replies[0].contains("Operação cancelada"));

    // Nothing was reset.
    let user = handler.store().user_by_contact(SENDER).unwrap();
    assert_eq!(user.current_balance, 1000.0);
}

#[test]
fn confirmation_without_pending_request_is_rejected() {
    let mut handler = handler_with_balance(1000.0);
    let replies = handler.handle(&msg(2, "SIM, ZERAR TUDO"), now());
    assert!(replies[0].contains("Operação cancelada"));
}

#[test]
fn scoped_resets_execute_directly() {
    let mut handler = handler_with_balance(1000.0);
    handler.handle(&msg(2, "/guardar 200"), now());

    let replies = handler.handle(&msg(3, "/zerar poupança"), now());
    assert!(replies[0].contains("POUPANÇA ZERADA"));

    let user = handler.store().user_by_contact(SENDER).unwrap();
    assert_eq!(user.savings_balance, 0.0);
    // Main balance keeps what was left after the transfer.
    assert_eq!(user.current_balance, 800.0);
}

#[test]
fn duplicate_message_is_processed_once() {
    let mut handler = handler_with_balance(1000.0);

    let first = handler.handle(&msg(7, "gastei 50 no mercado"), now());
    assert_eq!(first.len(), 1);
    let second = handler.handle(&msg(7, "gastei 50 no mercado"), now() + TimeDelta::seconds(2));
    assert!(second.is_empty());

    let user = handler.store().user_by_contact(SENDER).unwrap();
    assert_eq!(user.current_balance, 950.0);
}

#[test]
fn unknown_slash_command_gets_help_pointer() {
    let mut handler = handler_with_balance(1000.0);
    let replies = handler.handle(&msg(2, "/naoexiste"), now());
    assert!(replies[0].contains("Comando não reconhecido"));
}

#[test]
fn plain_chatter_is_ignored() {
    let mut handler = handler_with_balance(1000.0);
    assert!(handler.handle(&msg(2, "bom dia, tudo bem?"), now()).is_empty());
}

#[test]
fn low_balance_warning_fires_once() {
    let mut handler = handler_with_balance(1000.0);

    let replies = handler.handle(&msg(2, "gastei 750 no mercado"), now());
    assert_eq!(replies.len(), 2);
    assert!(replies[1].contains("AVISO DE SALDO BAIXO"));

    let replies = handler.handle(&msg(3, "gastei 10 no mercado"), now());
    assert_eq!(replies.len(), 1, "warning must not repeat");
}

#[test]
fn negative_balance_triggers_alert() {
    let mut handler = handler_with_balance(100.0);

    let replies = handler.handle(&msg(2, "gastei 150 no mercado"), now());
    assert_eq!(replies.len(), 2);
    assert!(replies[1].contains("saldo está negativo"));
}

#[test]
fn savings_and_emergency_roundtrip() {
    let mut handler = handler_with_balance(1000.0);

    let replies = handler.handle(&msg(2, "/guardar 300"), now());
    assert!(replies[0].contains("DINHEIRO GUARDADO"));
    let replies = handler.handle(&msg(3, "/reservar 200"), now());
    assert!(replies[0].contains("RESERVA REFORÇADA"));

    let user = handler.store().user_by_contact(SENDER).unwrap();
    assert_eq!(user.current_balance, 500.0);
    assert_eq!(user.savings_balance, 300.0);
    assert_eq!(user.emergency_fund, 200.0);

    // Withdrawing beyond the pocket fails.
    let replies = handler.handle(&msg(4, "/retirar 500"), now());
    assert!(replies[0].contains("Poupança insuficiente"));
}

#[test]
fn daily_report_groups_by_category() {
    let mut handler = handler_with_balance(1000.0);
    handler.handle(&msg(2, "gastei 50 no mercado"), now());
    handler.handle(&msg(3, "paguei 30 de uber"), now());

    let replies = handler.handle(&msg(4, "/relatório hoje"), now());
    let report = &replies[0];
    assert!(report.contains("RELATÓRIO DE HOJE"));
    assert!(report.contains("Alimentação"));
    assert!(report.contains("Transporte"));
    assert!(report.contains("R$ 80,00"));
    assert!(report.contains("R$ 920,00"));
}

#[test]
fn reminders_list_shows_pending_payments() {
    let mut handler = handler_with_balance(5000.0);
    handler.handle(&msg(2, "comprei celular 1200 em 12x"), now());

    let replies = handler.handle(&msg(3, "/lembretes"), now());
    assert!(replies[0].contains("LEMBRETES DE PAGAMENTO"));
    assert!(replies[0].contains("celular"));
    assert!(replies[0].contains("05/07/2024"));
}
