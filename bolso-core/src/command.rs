//! Slash-command classification.
//!
//! A data-driven ordered rule table: each row pairs a canonical command with
//! its regex and argument shape. Rows are scanned top to bottom and the first
//! match wins, so priority is declared in the table instead of buried in
//! control flow. Patterns accept accented and unaccented spellings.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::money::parse_decimal;

/// Canonical command names. Short report aliases never appear here: the
/// table rows for `/hoje`, `/semana`, `/mes` map straight to the long-form
/// report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    SetBalance,
    GetBalance,
    AddBalance,
    GetSavings,
    DepositSavings,
    WithdrawSavings,
    GetEmergency,
    DepositEmergency,
    WithdrawEmergency,
    GetInstallments,
    PayInstallment,
    GetReminders,
    GetDuePayments,
    ResetBalance,
    ResetSavings,
    ResetEmergency,
    ResetInstallments,
    ResetEverything,
    ConfirmReset,
    ReportDaily,
    ReportWeekly,
    ReportMonthly,
    Help,
    Start,
}

/// What the first capture group of a rule carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgKind {
    None,
    Amount,
    Description,
}

struct CommandRule {
    kind: CommandKind,
    pattern: &'static str,
    arg: ArgKind,
}

const AMOUNT: &str = r"(\d+(?:[.,]\d{1,2})?)";

/// Rule order resolves incidental overlaps (e.g. `/saldo 100` before
/// `/saldo`); patterns are disjoint in practice.
static COMMAND_RULES: LazyLock<Vec<(CommandKind, Regex, ArgKind)>> = LazyLock::new(|| {
    use ArgKind::*;
    use CommandKind::*;

    let rules = [
        // Main balance
        CommandRule { kind: SetBalance, pattern: r"^/saldo\s+@AMT", arg: Amount },
        CommandRule { kind: GetBalance, pattern: r"^/saldo\s*$", arg: None },
        CommandRule { kind: AddBalance, pattern: r"^/adicionar\s+@AMT", arg: Amount },
        // Savings
        CommandRule { kind: GetSavings, pattern: r"^/poupan[cç]a\s*$", arg: None },
        CommandRule { kind: DepositSavings, pattern: r"^/guardar\s+@AMT", arg: Amount },
        CommandRule { kind: WithdrawSavings, pattern: r"^/retirar\s+@AMT", arg: Amount },
        // Emergency fund
        CommandRule { kind: GetEmergency, pattern: r"^/emerg[eê]ncia\s*$", arg: None },
        CommandRule { kind: DepositEmergency, pattern: r"^/reservar\s+@AMT", arg: Amount },
        CommandRule { kind: WithdrawEmergency, pattern: r"^/usar\s+@AMT", arg: Amount },
        // Installments
        CommandRule { kind: GetInstallments, pattern: r"^/parcelamentos?\s*$", arg: None },
        CommandRule { kind: PayInstallment, pattern: r"^/pagar\s+(?:parcela\s+)?(.+)", arg: Description },
        // Reminders
        CommandRule { kind: GetReminders, pattern: r"^/(?:lembretes?|lembrar|avisos?)", arg: None },
        CommandRule { kind: GetDuePayments, pattern: r"^/(?:vencidas?|atrasadas?|pendentes?)", arg: None },
        // Resets
        CommandRule { kind: ResetBalance, pattern: r"^/(?:zerar|resetar|limpar)\s+saldo\s*$", arg: None },
        CommandRule { kind: ResetSavings, pattern: r"^/(?:zerar|resetar|limpar)\s+poupan[cç]a\s*$", arg: None },
        CommandRule {
            kind: ResetEmergency,
            pattern: r"^/(?:zerar|resetar|limpar)\s+(?:reserva\s+emerg[eê]ncia|reserva)\s*$",
            arg: None,
        },
        CommandRule {
            kind: ResetInstallments,
            pattern: r"^/(?:zerar|resetar|limpar|apagar)\s+(?:parcelas?|parcelamentos?)\s*$",
            arg: None,
        },
        CommandRule { kind: ResetEverything, pattern: r"^/(?:zerar|resetar|limpar)\s+(?:tudo|sistema)\s*$", arg: None },
        // Explicit confirmation phrase for the full reset
        CommandRule { kind: ConfirmReset, pattern: r"^SIM,?\s*ZERAR\s+TUDO\s*$", arg: None },
        // Reports, long form
        CommandRule { kind: ReportDaily, pattern: r"^/relat[oó]rio\s+(?:hoje|di[aá]rio|diario|day|daily)", arg: None },
        CommandRule { kind: ReportWeekly, pattern: r"^/relat[oó]rio\s+(?:semana|semanal|week|weekly)", arg: None },
        CommandRule { kind: ReportMonthly, pattern: r"^/relat[oó]rio\s+(?:m[eê]s|mes|mensal|month|monthly)", arg: None },
        // Reports, short aliases (normalized by the table itself)
        CommandRule { kind: ReportDaily, pattern: r"^/(?:hoje|di[aá]rio|diario)\s*$", arg: None },
        CommandRule { kind: ReportWeekly, pattern: r"^/(?:semana|semanal)\s*$", arg: None },
        CommandRule { kind: ReportMonthly, pattern: r"^/(?:m[eê]s|mes|mensal)\s*$", arg: None },
        // Misc
        CommandRule { kind: Help, pattern: r"^/(?:ajuda|help|comandos)", arg: None },
        CommandRule { kind: Start, pattern: r"^/(?:start|come[çc]ar|comecar)", arg: None },
    ];

    rules
        .iter()
        .map(|r| {
            let pattern = format!("(?i){}", r.pattern.replace("@AMT", AMOUNT));
            (r.kind, Regex::new(&pattern).expect("command pattern"), r.arg)
        })
        .collect()
});

/// A classified slash-command with its optional argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub kind: CommandKind,
    pub amount: Option<f64>,
    pub description: Option<String>,
}

/// Scan the rule table in order; first matching rule wins. Returns `None`
/// when no rule matches.
pub fn parse_command(text: &str) -> Option<ParsedCommand> {
    let trimmed = text.trim();

    for (kind, pattern, arg) in COMMAND_RULES.iter() {
        let Some(caps) = pattern.captures(trimmed) else {
            continue;
        };

        let mut parsed = ParsedCommand { kind: *kind, amount: None, description: None };
        match arg {
            ArgKind::None => {}
            ArgKind::Amount => parsed.amount = caps.get(1).and_then(|m| parse_decimal(m.as_str())),
            ArgKind::Description => {
                parsed.description = caps.get(1).map(|m| m.as_str().trim().to_string());
            }
        }
        return Some(parsed);
    }

    None
}
