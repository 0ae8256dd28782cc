//! Human-readable reply templating, Portuguese, WhatsApp-flavored markdown
//! (*bold*, emoji, monospace backticks).

use std::collections::HashMap;

use chrono::{DateTime, Datelike, TimeDelta, Utc};

use bolso_core::category::Category;
use bolso_core::confirm::ResetScope;
use bolso_core::time::{br_day_start_utc, format_datetime_br, format_naive_date_br, today_br};

use crate::store::{FinanceStore, Installment, LedgerEntry, StoredPayment, User};
use crate::store::EntryKind;

/// "R$ 1234,56" — two decimals, comma separator, no thousands grouping.
pub fn format_money(value: f64) -> String {
    format!("R$ {value:.2}").replace('.', ",")
}

pub fn welcome(name: &str) -> String {
    format!(
        "👋 Olá, *{name}*!\n\n\
         Sou o *Bolso*, seu assistente financeiro.\n\n\
         Comece definindo seu saldo: `/saldo 1000`\n\
         Depois é só me contar seus gastos:\n\
         _\"gastei 50 no mercado\"_\n\
         _\"comprei celular 1200 em 12x\"_\n\n\
         Digite `/ajuda` para ver todos os comandos."
    )
}

pub fn help_text() -> String {
    "📖 *COMANDOS DISPONÍVEIS*\n\n\
     💰 *Saldo*\n\
     `/saldo 1000` — definir saldo inicial\n\
     `/saldo` — ver resumo financeiro\n\
     `/adicionar 200` — adicionar dinheiro\n\n\
     🐷 *Poupança*\n\
     `/guardar 100` · `/retirar 50` · `/poupança`\n\n\
     🚨 *Reserva de emergência*\n\
     `/reservar 200` · `/usar 100` · `/emergência`\n\n\
     📦 *Parcelamentos*\n\
     `/parcelamentos` — listar compras parceladas\n\
     `/pagar <nome>` — pagar próxima parcela\n\
     `/lembretes` — parcelas vencendo\n\n\
     📊 *Relatórios*\n\
     `/relatório hoje` · `/relatório semana` · `/relatório mês`\n\n\
     ☢️ *Zeragem*\n\
     `/zerar saldo` · `/zerar poupança` · `/zerar reserva`\n\
     `/zerar parcelas` · `/zerar tudo`\n\n\
     💬 Gastos em linguagem natural:\n\
     _\"gastei 50 no mercado\"_, _\"paguei R$ 30 de uber\"_"
        .to_string()
}

pub fn balance_report(user: &User, now: DateTime<Utc>) -> String {
    let total = user.total_money();
    let percentage = if user.initial_balance > 0.0 {
        (user.current_balance / user.initial_balance) * 100.0
    } else {
        0.0
    };
    let spent = user.initial_balance - user.current_balance;

    let emoji = if percentage < 20.0 {
        "🚨"
    } else if percentage < 50.0 {
        "⚠️"
    } else {
        "💰"
    };

    let mut report = format!(
        "{emoji} *RESUMO FINANCEIRO*\n\n\
         👤 *Usuário:* {}\n\
         📅 *Data:* {}\n\n\
         💵 *SALDO PRINCIPAL*\n\
         \u{20}  Inicial: {}\n\
         \u{20}  Gasto: {}\n\
         \u{20}  Disponível: *{}*\n\
         \u{20}  └─ {:.1}% restante\n\n",
        user.name,
        format_datetime_br(now),
        format_money(user.initial_balance),
        format_money(spent),
        format_money(user.current_balance),
        percentage,
    );

    if user.savings_balance > 0.0 {
        report.push_str(&format!(
            "🐷 *POUPANÇA*\n\u{20}  Guardado: *{}*\n\n",
            format_money(user.savings_balance)
        ));
    }
    if user.emergency_fund > 0.0 {
        report.push_str(&format!(
            "🚨 *RESERVA DE EMERGÊNCIA*\n\u{20}  Reservado: *{}*\n\n",
            format_money(user.emergency_fund)
        ));
    }

    report.push_str(&format!("💎 *PATRIMÔNIO TOTAL*\n\u{20}  *{}*", format_money(total)));
    report
}

pub fn savings_report(user: &User) -> String {
    format!(
        "🐷 *POUPANÇA*\n\n\
         💵 Saldo guardado: *{}*\n\n\
         Use `/guardar 100` para guardar dinheiro\n\
         Use `/retirar 50` para retirar",
        format_money(user.savings_balance)
    )
}

pub fn emergency_report(user: &User) -> String {
    format!(
        "🚨 *RESERVA DE EMERGÊNCIA*\n\n\
         💵 Saldo reservado: *{}*\n\n\
         Use `/reservar 200` para adicionar\n\
         Use `/usar 100` para utilizar",
        format_money(user.emergency_fund)
    )
}

pub fn balance_set_confirmation(amount: f64, now: DateTime<Utc>) -> String {
    format!(
        "✅ *SALDO DEFINIDO COM SUCESSO*\n\n\
         💰 *Valor:* {}\n\
         🕒 *Data/Hora:* {}\n\n\
         Agora você pode registrar seus gastos!\n\
         Use `/ajuda` para ver todos os comandos.",
        format_money(amount),
        format_datetime_br(now),
    )
}

pub fn balance_added_confirmation(amount: f64, user: &User, now: DateTime<Utc>) -> String {
    let mut report = format!(
        "✅ *SALDO ADICIONADO COM SUCESSO*\n\n\
         💵 *Valor adicionado:* {}\n\
         🕒 *Data/Hora:* {}\n\n\
         💰 *NOVO SALDO*\n\
         \u{20}  Principal: *{}*\n",
        format_money(amount),
        format_datetime_br(now),
        format_money(user.current_balance),
    );
    if user.savings_balance > 0.0 {
        report.push_str(&format!("\u{20}  Poupança: {}\n", format_money(user.savings_balance)));
    }
    if user.emergency_fund > 0.0 {
        report.push_str(&format!("\u{20}  Emergência: {}\n", format_money(user.emergency_fund)));
    }
    report.push_str(&format!("\u{20}  Total: {}", format_money(user.total_money())));
    report
}

pub fn savings_confirmation(deposit: bool, amount: f64, user: &User) -> String {
    let title = if deposit { "✅ *DINHEIRO GUARDADO*" } else { "✅ *RETIRADA DA POUPANÇA*" };
    format!(
        "{title}\n\n\
         🐷 *Valor:* {}\n\
         💵 *Poupança:* {}\n\
         💰 *Saldo principal:* {}",
        format_money(amount),
        format_money(user.savings_balance),
        format_money(user.current_balance),
    )
}

pub fn emergency_confirmation(deposit: bool, amount: f64, user: &User) -> String {
    let title = if deposit { "✅ *RESERVA REFORÇADA*" } else { "✅ *RESERVA UTILIZADA*" };
    format!(
        "{title}\n\n\
         🚨 *Valor:* {}\n\
         💵 *Reserva:* {}\n\
         💰 *Saldo principal:* {}",
        format_money(amount),
        format_money(user.emergency_fund),
        format_money(user.current_balance),
    )
}

pub fn expense_confirmation(entry: &LedgerEntry, user: &User, category: &Category) -> String {
    format!(
        "✅ *GASTO REGISTRADO*\n\n\
         💸 *Valor:* {}\n\
         📝 *Descrição:* {}\n\
         {} *Categoria:* {}\n\
         🕒 *Data/Hora:* {}\n\n\
         💰 *Saldo disponível:* {}",
        format_money(entry.amount),
        entry.description,
        category.emoji,
        category.name,
        format_datetime_br(entry.date),
        format_money(user.current_balance),
    )
}

pub fn installment_confirmation(installment: &Installment, category: &Category) -> String {
    format!(
        "📦 *COMPRA PARCELADA REGISTRADA*\n\n\
         📝 *Descrição:* {}\n\
         💰 *Valor total:* {}\n\
         📅 *Parcelas:* {}x de {}\n\
         {} *Categoria:* {}\n\n\
         A primeira parcela vence no dia 5 do próximo mês.\n\
         Use `/parcelamentos` para acompanhar.",
        installment.description,
        format_money(installment.total_amount),
        installment.total_installments,
        format_money(installment.installment_amount),
        category.emoji,
        category.name,
    )
}

pub fn payment_confirmation(installment: &Installment, payment: &StoredPayment, user: &User) -> String {
    format!(
        "✅ *PARCELA PAGA*\n\n\
         📝 *{}* — parcela {}/{}\n\
         💸 *Valor:* {}\n\
         💰 *Saldo disponível:* {}",
        installment.description,
        payment.payment.number,
        installment.total_installments,
        format_money(payment.payment.amount),
        format_money(user.current_balance),
    )
}

pub fn installments_list<S: FinanceStore>(store: &S, user_id: i64) -> String {
    let installments = store.installments_by_user(user_id);
    if installments.is_empty() {
        return "ℹ️ *Nenhuma compra parcelada registrada*\n\n\
                Registre uma: _\"comprei celular 1200 em 12x\"_"
            .to_string();
    }

    let mut report = String::from("📦 *SEUS PARCELAMENTOS*\n");
    for installment in &installments {
        let payments = store.payments_for(installment.id);
        let paid = payments
            .iter()
            .filter(|p| p.payment.status == bolso_core::schedule::PaymentStatus::Paid)
            .count();
        let next_due = store
            .next_pending_payment(installment.id)
            .map(|p| format!("próxima em {}", format_naive_date_br(p.payment.due_date)))
            .unwrap_or_else(|| "quitado ✅".to_string());

        report.push_str(&format!(
            "\n📝 *{}*\n\
             \u{20}  {}/{} pagas · {}x de {}\n\
             \u{20}  {}\n",
            installment.description,
            paid,
            installment.total_installments,
            installment.total_installments,
            format_money(installment.installment_amount),
            next_due,
        ));
    }
    report.push_str("\nUse `/pagar <nome>` para quitar a próxima parcela");
    report
}

pub fn reminders_list<S: FinanceStore>(store: &S, user_id: i64, now: DateTime<Utc>) -> String {
    let today = today_br(now);
    let pending = store.pending_payments(user_id);

    if pending.is_empty() {
        return "✅ *Nenhuma parcela pendente*\n\nVocê está em dia!".to_string();
    }

    let mut overdue = String::new();
    let mut due_today = String::new();
    let mut upcoming = String::new();

    for (payment, installment) in &pending {
        let line = format!(
            "• *{}* — parcela {}/{} de {} ({})\n",
            installment.description,
            payment.payment.number,
            installment.total_installments,
            format_money(payment.payment.amount),
            format_naive_date_br(payment.payment.due_date),
        );
        if payment.payment.due_date < today {
            overdue.push_str(&line);
        } else if payment.payment.due_date == today {
            due_today.push_str(&line);
        } else {
            upcoming.push_str(&line);
        }
    }

    let mut report = String::from("🔔 *LEMBRETES DE PAGAMENTO*\n");
    if !overdue.is_empty() {
        report.push_str("\n⚠️ *Vencidas*\n");
        report.push_str(&overdue);
    }
    if !due_today.is_empty() {
        report.push_str("\n📅 *Vencem hoje*\n");
        report.push_str(&due_today);
    }
    if !upcoming.is_empty() {
        report.push_str("\n📆 *Próximas*\n");
        report.push_str(&upcoming);
    }
    report.push_str("\nUse `/pagar <nome>` para quitar uma parcela");
    report
}

/// Which window a period report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl ReportPeriod {
    fn title(self) -> &'static str {
        match self {
            ReportPeriod::Daily => "📊 *RELATÓRIO DE HOJE*",
            ReportPeriod::Weekly => "📊 *RELATÓRIO DA SEMANA*",
            ReportPeriod::Monthly => "📊 *RELATÓRIO DO MÊS*",
        }
    }

    fn start_utc(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = today_br(now);
        match self {
            ReportPeriod::Daily => br_day_start_utc(today),
            ReportPeriod::Weekly => br_day_start_utc(today - TimeDelta::days(6)),
            ReportPeriod::Monthly => {
                br_day_start_utc(today.with_day(1).unwrap_or(today))
            }
        }
    }
}

pub fn period_report<S: FinanceStore>(
    store: &S,
    user: &User,
    period: ReportPeriod,
    now: DateTime<Utc>,
) -> String {
    let start = period.start_utc(now);
    let expenses: Vec<LedgerEntry> = store
        .entries_between(user.id, start, now)
        .into_iter()
        .filter(|e| e.kind == EntryKind::Expense)
        .collect();

    let mut report = format!("{}\n📅 {}\n\n", period.title(), format_datetime_br(now));

    if expenses.is_empty() {
        report.push_str("Nenhum gasto registrado neste período. 🎉\n\n");
    } else {
        // category id -> (total, count), rendered highest total first
        let mut by_category: HashMap<i64, (f64, u32)> = HashMap::new();
        for e in &expenses {
            let slot = by_category.entry(e.category_id).or_insert((0.0, 0));
            slot.0 += e.amount;
            slot.1 += 1;
        }
        let mut rows: Vec<(i64, f64, u32)> = by_category
            .into_iter()
            .map(|(id, (total, count))| (id, total, count))
            .collect();
        rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        for (category_id, total, count) in rows {
            let (emoji, name) = store
                .category_by_id(category_id)
                .map(|c| (c.emoji, c.name))
                .unwrap_or_else(|| ("📦".to_string(), "Outros".to_string()));
            report.push_str(&format!("{emoji} {name}: {} ({count}x)\n", format_money(total)));
        }

        let total: f64 = expenses.iter().map(|e| e.amount).sum();
        report.push_str(&format!("\n💸 *Total gasto:* {}\n\n", format_money(total)));
    }

    report.push_str(&format!("💰 *Saldo atual:* {}", format_money(user.current_balance)));
    report
}

pub fn reset_warning(scope: ResetScope) -> String {
    let target = match scope {
        ResetScope::Balance => "o saldo principal",
        ResetScope::Savings => "a poupança",
        ResetScope::Emergency => "a reserva de emergência",
        ResetScope::Installments => "os parcelamentos",
        ResetScope::Everything => "TODO o sistema (saldos, gastos e parcelamentos)",
    };
    format!(
        "⚠️ *CONFIRMAÇÃO NECESSÁRIA*\n\n\
         Esta ação é irreversível!\n\
         Você está prestes a zerar {target}.\n\n\
         Para confirmar, envie o comando novamente\n\
         ou responda:\n\n\
         *SIM, ZERAR TUDO*"
    )
}

pub fn reset_confirmation(scope: ResetScope, now: DateTime<Utc>) -> String {
    let title = match scope {
        ResetScope::Balance => "✅ *SALDO ZERADO*",
        ResetScope::Savings => "✅ *POUPANÇA ZERADA*",
        ResetScope::Emergency => "✅ *RESERVA DE EMERGÊNCIA ZERADA*",
        ResetScope::Installments => "✅ *PARCELAMENTOS APAGADOS*",
        ResetScope::Everything => "☢️ *SISTEMA TOTALMENTE ZERADO*",
    };
    format!("{title}\n\n🕒 {}", format_datetime_br(now))
}

pub fn negative_balance_alert() -> String {
    "🚨 *ATENÇÃO!*\n\nSeu saldo está negativo!\nVocê está gastando mais do que tem.".to_string()
}

pub fn low_balance_warning(percentage_remaining: f64) -> String {
    format!(
        "⚠️ *AVISO DE SALDO BAIXO*\n\n\
         Você já gastou 70% do seu dinheiro!\n\
         Restam apenas {percentage_remaining:.0}% do total.\n\n\
         💡 *Dica:* Considere reduzir gastos ou adicionar mais saldo."
    )
}

pub fn installment_fully_paid() -> String {
    "✅ Este parcelamento já foi totalmente pago!".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_formats_with_comma() {
        assert_eq!(format_money(1234.5), "R$ 1234,50");
        assert_eq!(format_money(0.0), "R$ 0,00");
        assert_eq!(format_money(-12.3), "R$ -12,30");
    }

    #[test]
    fn balance_report_includes_pockets_only_when_nonzero() {
        let now = DateTime::parse_from_rfc3339("2024-06-15T18:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut user = User {
            id: 1,
            contact_id: "c".into(),
            name: "Ana".into(),
            initial_balance: 1000.0,
            current_balance: 600.0,
            savings_balance: 0.0,
            emergency_fund: 0.0,
            low_balance_warned: false,
        };

        let report = balance_report(&user, now);
        assert!(report.contains("RESUMO FINANCEIRO"));
        assert!(report.contains("R$ 600,00"));
        assert!(!report.contains("POUPANÇA"));

        user.savings_balance = 150.0;
        assert!(balance_report(&user, now).contains("POUPANÇA"));
    }

    #[test]
    fn reset_warning_names_the_target() {
        assert!(reset_warning(ResetScope::Everything).contains("TODO o sistema"));
        assert!(reset_warning(ResetScope::Savings).contains("poupança"));
    }
}
