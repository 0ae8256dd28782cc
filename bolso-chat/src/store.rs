//! Storage collaborator boundary.
//!
//! The engine only ever talks to storage through [`FinanceStore`]; the real
//! deployment plugs a database behind it. [`MemoryStore`] is the in-process
//! implementation used by the CLI and the tests. Persistence format design is
//! out of scope here.
//!
//! Every balance mutation rounds with [`round2`] at the point of mutation, so
//! stored balances accumulate rounding exactly as computed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bolso_core::category::Category;
use bolso_core::money::round2;
use bolso_core::schedule::{InstallmentPayment, PaymentStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// Transport-level identity (phone/jid/handle).
    pub contact_id: String,
    pub name: String,
    pub initial_balance: f64,
    pub current_balance: f64,
    pub savings_balance: f64,
    pub emergency_fund: f64,
    pub low_balance_warned: bool,
}

impl User {
    /// Main + savings + emergency.
    pub fn total_money(&self) -> f64 {
        round2(self.current_balance + self.savings_balance + self.emergency_fund)
    }
}

/// What a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Expense,
    SavingsDeposit,
    SavingsWithdrawal,
    EmergencyDeposit,
    EmergencyWithdrawal,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64,
    pub description: String,
    pub category_id: i64,
    pub kind: EntryKind,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub total_amount: f64,
    pub installment_amount: f64,
    pub total_installments: u32,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPayment {
    pub id: i64,
    pub installment_id: i64,
    pub payment: InstallmentPayment,
    pub paid_at: Option<DateTime<Utc>>,
}

/// CRUD-style operations the engine consumes. Mirrors the data-access layer
/// of the deployed bot; kept synchronous on purpose — the core is
/// single-threaded and event-driven.
pub trait FinanceStore {
    // Users
    fn user_by_contact(&self, contact_id: &str) -> Option<User>;
    fn user_by_id(&self, user_id: i64) -> Option<User>;
    fn upsert_user(&mut self, contact_id: &str, name: &str) -> User;

    // Main balance
    fn set_initial_balance(&mut self, user_id: i64, amount: f64) -> bool;
    fn add_balance(&mut self, user_id: i64, amount: f64) -> bool;
    fn set_low_balance_warned(&mut self, user_id: i64, warned: bool);

    // Savings / emergency fund. All return false on missing user or
    // insufficient funds.
    fn deposit_savings(&mut self, user_id: i64, amount: f64, now: DateTime<Utc>) -> bool;
    fn withdraw_savings(&mut self, user_id: i64, amount: f64, now: DateTime<Utc>) -> bool;
    fn deposit_emergency(&mut self, user_id: i64, amount: f64, now: DateTime<Utc>) -> bool;
    fn withdraw_emergency(&mut self, user_id: i64, amount: f64, now: DateTime<Utc>) -> bool;

    // Categories
    /// Ordered by name; the matcher's tie-break depends on this order.
    fn list_categories(&self) -> Vec<Category>;
    fn category_by_id(&self, id: i64) -> Option<Category>;

    // Ledger
    /// Records the expense and debits the user's balance.
    fn record_expense(
        &mut self,
        user_id: i64,
        amount: f64,
        description: &str,
        category_id: i64,
        now: DateTime<Utc>,
    ) -> Option<LedgerEntry>;
    fn entries_between(&self, user_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<LedgerEntry>;

    // Installments
    #[allow(clippy::too_many_arguments)]
    fn create_installment(
        &mut self,
        user_id: i64,
        description: &str,
        total_amount: f64,
        installment_amount: f64,
        category_id: i64,
        schedule: Vec<InstallmentPayment>,
        now: DateTime<Utc>,
    ) -> Installment;
    /// Newest first.
    fn installments_by_user(&self, user_id: i64) -> Vec<Installment>;
    /// Case-insensitive substring search over descriptions, newest first.
    fn find_installment(&self, user_id: i64, partial: &str) -> Option<Installment>;
    fn payments_for(&self, installment_id: i64) -> Vec<StoredPayment>;
    fn next_pending_payment(&self, installment_id: i64) -> Option<StoredPayment>;
    /// Marks the payment paid, debits the balance and records the expense.
    fn pay_installment(&mut self, payment_id: i64, user_id: i64, now: DateTime<Utc>) -> bool;
    /// Every pending payment of the user joined with its installment,
    /// ordered by due date.
    fn pending_payments(&self, user_id: i64) -> Vec<(StoredPayment, Installment)>;

    // Resets
    fn reset_balance(&mut self, user_id: i64, now: DateTime<Utc>) -> bool;
    fn reset_savings(&mut self, user_id: i64, now: DateTime<Utc>) -> bool;
    fn reset_emergency(&mut self, user_id: i64, now: DateTime<Utc>) -> bool;
    fn reset_installments(&mut self, user_id: i64, now: DateTime<Utc>) -> bool;
    fn reset_everything(&mut self, user_id: i64, now: DateTime<Utc>) -> bool;
}

/// The default category set the bot ships with. "Outros", "Poupança" and
/// "Emergência" are reserved (see [`bolso_core::category::RESERVED_CATEGORIES`]).
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(1, "Alimentação", "🍔", &[
            "mercado", "supermercado", "restaurante", "lanche", "almoço", "almocei", "jantar",
            "jantei", "comida", "ifood", "padaria", "açougue", "feira", "pizza", "café",
        ]),
        Category::new(2, "Transporte", "🚗", &[
            "uber", "99", "taxi", "ônibus", "onibus", "metrô", "metro", "gasolina",
            "combustível", "combustivel", "estacionamento", "pedágio", "pedagio", "passagem",
        ]),
        Category::new(3, "Moradia", "🏠", &[
            "aluguel", "condomínio", "condominio", "luz", "água", "agua", "energia",
            "internet", "gás", "gas", "iptu",
        ]),
        Category::new(4, "Saúde", "💊", &[
            "farmácia", "farmacia", "remédio", "remedio", "médico", "medico", "consulta",
            "exame", "dentista", "academia",
        ]),
        Category::new(5, "Educação", "📚", &[
            "curso", "faculdade", "escola", "livro", "material", "mensalidade",
        ]),
        Category::new(6, "Lazer", "🎮", &[
            "cinema", "show", "viagem", "bar", "festa", "jogo", "streaming", "netflix", "spotify",
        ]),
        Category::new(7, "Compras", "🛍️", &[
            "roupa", "tênis", "tenis", "celular", "notebook", "presente", "loja", "shopping",
        ]),
        Category::new(8, "Contas", "📄", &[
            "fatura", "cartão", "cartao", "boleto", "conta", "empréstimo", "emprestimo",
            "assinatura",
        ]),
        Category::new(9, "Outros", "📦", &[]),
        Category::new(10, "Poupança", "🐷", &[]),
        Category::new(11, "Emergência", "🚨", &[]),
    ]
}

/// In-memory store seeded with the default categories.
#[derive(Debug)]
pub struct MemoryStore {
    users: Vec<User>,
    categories: Vec<Category>,
    entries: Vec<LedgerEntry>,
    installments: Vec<Installment>,
    payments: Vec<StoredPayment>,
    next_id: i64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_categories(default_categories())
    }
}

impl MemoryStore {
    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            users: Vec::new(),
            categories,
            entries: Vec::new(),
            installments: Vec::new(),
            payments: Vec::new(),
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn user_mut(&mut self, user_id: i64) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == user_id)
    }

    fn category_id_by_name(&self, name: &str) -> Option<i64> {
        self.categories.iter().find(|c| c.name == name).map(|c| c.id)
    }

    fn outros_id(&self) -> i64 {
        self.category_id_by_name("Outros")
            .or_else(|| self.categories.last().map(|c| c.id))
            .unwrap_or(0)
    }

    fn log_entry(
        &mut self,
        user_id: i64,
        amount: f64,
        description: &str,
        category_id: i64,
        kind: EntryKind,
        now: DateTime<Utc>,
    ) -> LedgerEntry {
        let entry = LedgerEntry {
            id: self.next_id(),
            user_id,
            amount,
            description: description.to_string(),
            category_id,
            kind,
            date: now,
        };
        self.entries.push(entry.clone());
        entry
    }

    /// Move `amount` from the main balance into a side pocket (or back).
    /// Returns false when the source pocket cannot cover it.
    fn transfer(
        &mut self,
        user_id: i64,
        amount: f64,
        from_main: bool,
        pocket: Pocket,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(user) = self.user_mut(user_id) else {
            return false;
        };

        let pocket_balance = match pocket {
            Pocket::Savings => user.savings_balance,
            Pocket::Emergency => user.emergency_fund,
        };
        let source = if from_main { user.current_balance } else { pocket_balance };
        if source < amount {
            return false;
        }

        let delta = if from_main { -amount } else { amount };
        user.current_balance = round2(user.current_balance + delta);
        match pocket {
            Pocket::Savings => user.savings_balance = round2(user.savings_balance - delta),
            Pocket::Emergency => user.emergency_fund = round2(user.emergency_fund - delta),
        }

        let (category, description, kind) = match (pocket, from_main) {
            (Pocket::Savings, true) => ("Poupança", "Transferência para poupança", EntryKind::SavingsDeposit),
            (Pocket::Savings, false) => ("Poupança", "Retirada da poupança", EntryKind::SavingsWithdrawal),
            (Pocket::Emergency, true) => {
                ("Emergência", "Depósito na reserva de emergência", EntryKind::EmergencyDeposit)
            }
            (Pocket::Emergency, false) => {
                ("Emergência", "Retirada da reserva de emergência", EntryKind::EmergencyWithdrawal)
            }
        };
        let category_id = self.category_id_by_name(category).unwrap_or_else(|| self.outros_id());
        self.log_entry(user_id, amount, description, category_id, kind, now);
        true
    }
}

#[derive(Clone, Copy)]
enum Pocket {
    Savings,
    Emergency,
}

impl FinanceStore for MemoryStore {
    fn user_by_contact(&self, contact_id: &str) -> Option<User> {
        self.users.iter().find(|u| u.contact_id == contact_id).cloned()
    }

    fn user_by_id(&self, user_id: i64) -> Option<User> {
        self.users.iter().find(|u| u.id == user_id).cloned()
    }

    fn upsert_user(&mut self, contact_id: &str, name: &str) -> User {
        if let Some(user) = self.users.iter_mut().find(|u| u.contact_id == contact_id) {
            user.name = name.to_string();
            return user.clone();
        }
        let user = User {
            id: self.next_id(),
            contact_id: contact_id.to_string(),
            name: name.to_string(),
            initial_balance: 0.0,
            current_balance: 0.0,
            savings_balance: 0.0,
            emergency_fund: 0.0,
            low_balance_warned: false,
        };
        self.users.push(user.clone());
        user
    }

    fn set_initial_balance(&mut self, user_id: i64, amount: f64) -> bool {
        let Some(user) = self.user_mut(user_id) else {
            return false;
        };
        let amount = round2(amount);
        user.initial_balance = amount;
        user.current_balance = amount;
        true
    }

    fn add_balance(&mut self, user_id: i64, amount: f64) -> bool {
        let Some(user) = self.user_mut(user_id) else {
            return false;
        };
        user.initial_balance = round2(user.initial_balance + amount);
        user.current_balance = round2(user.current_balance + amount);
        true
    }

    fn set_low_balance_warned(&mut self, user_id: i64, warned: bool) {
        if let Some(user) = self.user_mut(user_id) {
            user.low_balance_warned = warned;
        }
    }

    fn deposit_savings(&mut self, user_id: i64, amount: f64, now: DateTime<Utc>) -> bool {
        self.transfer(user_id, amount, true, Pocket::Savings, now)
    }

    fn withdraw_savings(&mut self, user_id: i64, amount: f64, now: DateTime<Utc>) -> bool {
        self.transfer(user_id, amount, false, Pocket::Savings, now)
    }

    fn deposit_emergency(&mut self, user_id: i64, amount: f64, now: DateTime<Utc>) -> bool {
        self.transfer(user_id, amount, true, Pocket::Emergency, now)
    }

    fn withdraw_emergency(&mut self, user_id: i64, amount: f64, now: DateTime<Utc>) -> bool {
        self.transfer(user_id, amount, false, Pocket::Emergency, now)
    }

    fn list_categories(&self) -> Vec<Category> {
        let mut categories = self.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        categories
    }

    fn category_by_id(&self, id: i64) -> Option<Category> {
        self.categories.iter().find(|c| c.id == id).cloned()
    }

    fn record_expense(
        &mut self,
        user_id: i64,
        amount: f64,
        description: &str,
        category_id: i64,
        now: DateTime<Utc>,
    ) -> Option<LedgerEntry> {
        let user = self.user_mut(user_id)?;
        user.current_balance = round2(user.current_balance - amount);
        Some(self.log_entry(user_id, amount, description, category_id, EntryKind::Expense, now))
    }

    fn entries_between(&self, user_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<LedgerEntry> {
        let mut entries: Vec<LedgerEntry> = self
            .entries
            .iter()
            .filter(|e| e.user_id == user_id && e.date >= start && e.date <= end)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries
    }

    fn create_installment(
        &mut self,
        user_id: i64,
        description: &str,
        total_amount: f64,
        installment_amount: f64,
        category_id: i64,
        schedule: Vec<InstallmentPayment>,
        now: DateTime<Utc>,
    ) -> Installment {
        let installment = Installment {
            id: self.next_id(),
            user_id,
            description: description.to_string(),
            total_amount,
            installment_amount,
            total_installments: schedule.len() as u32,
            category_id,
            created_at: now,
        };
        self.installments.push(installment.clone());

        for payment in schedule {
            let id = self.next_id();
            self.payments.push(StoredPayment {
                id,
                installment_id: installment.id,
                payment,
                paid_at: None,
            });
        }

        installment
    }

    fn installments_by_user(&self, user_id: i64) -> Vec<Installment> {
        let mut list: Vec<Installment> = self
            .installments
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    fn find_installment(&self, user_id: i64, partial: &str) -> Option<Installment> {
        let needle = partial.trim().to_lowercase();
        self.installments_by_user(user_id)
            .into_iter()
            .find(|i| i.description.to_lowercase().contains(&needle))
    }

    fn payments_for(&self, installment_id: i64) -> Vec<StoredPayment> {
        let mut list: Vec<StoredPayment> = self
            .payments
            .iter()
            .filter(|p| p.installment_id == installment_id)
            .cloned()
            .collect();
        list.sort_by_key(|p| p.payment.number);
        list
    }

    fn next_pending_payment(&self, installment_id: i64) -> Option<StoredPayment> {
        self.payments_for(installment_id)
            .into_iter()
            .find(|p| p.payment.status == PaymentStatus::Pending)
    }

    fn pay_installment(&mut self, payment_id: i64, user_id: i64, now: DateTime<Utc>) -> bool {
        let Some(stored) = self.payments.iter().find(|p| p.id == payment_id).cloned() else {
            return false;
        };
        let Some(user) = self.user_by_id(user_id) else {
            return false;
        };
        if user.current_balance < stored.payment.amount {
            return false;
        }
        let Some(installment) = self
            .installments
            .iter()
            .find(|i| i.id == stored.installment_id)
            .cloned()
        else {
            return false;
        };

        if let Some(p) = self.payments.iter_mut().find(|p| p.id == payment_id) {
            p.payment.status = PaymentStatus::Paid;
            p.paid_at = Some(now);
        }

        let description = format!(
            "{} (parcela {}/{})",
            installment.description, stored.payment.number, installment.total_installments
        );
        self.record_expense(user_id, stored.payment.amount, &description, installment.category_id, now)
            .is_some()
    }

    fn pending_payments(&self, user_id: i64) -> Vec<(StoredPayment, Installment)> {
        let mut list: Vec<(StoredPayment, Installment)> = self
            .payments
            .iter()
            .filter(|p| p.payment.status == PaymentStatus::Pending)
            .filter_map(|p| {
                self.installments
                    .iter()
                    .find(|i| i.id == p.installment_id && i.user_id == user_id)
                    .map(|i| (p.clone(), i.clone()))
            })
            .collect();
        list.sort_by_key(|(p, _)| p.payment.due_date);
        list
    }

    fn reset_balance(&mut self, user_id: i64, now: DateTime<Utc>) -> bool {
        let Some(user) = self.user_mut(user_id) else {
            return false;
        };
        user.current_balance = 0.0;
        user.initial_balance = 0.0;
        user.low_balance_warned = false;
        let outros = self.outros_id();
        self.log_entry(user_id, 0.0, "Saldo zerado", outros, EntryKind::Reset, now);
        true
    }

    fn reset_savings(&mut self, user_id: i64, now: DateTime<Utc>) -> bool {
        let Some(user) = self.user_mut(user_id) else {
            return false;
        };
        if user.savings_balance == 0.0 {
            return false;
        }
        user.savings_balance = 0.0;
        let outros = self.outros_id();
        self.log_entry(user_id, 0.0, "Poupança zerada", outros, EntryKind::Reset, now);
        true
    }

    fn reset_emergency(&mut self, user_id: i64, now: DateTime<Utc>) -> bool {
        let Some(user) = self.user_mut(user_id) else {
            return false;
        };
        if user.emergency_fund == 0.0 {
            return false;
        }
        user.emergency_fund = 0.0;
        let outros = self.outros_id();
        self.log_entry(user_id, 0.0, "Reserva de emergência zerada", outros, EntryKind::Reset, now);
        true
    }

    fn reset_installments(&mut self, user_id: i64, now: DateTime<Utc>) -> bool {
        let owned: Vec<i64> = self
            .installments
            .iter()
            .filter(|i| i.user_id == user_id)
            .map(|i| i.id)
            .collect();
        if owned.is_empty() {
            return false;
        }
        self.payments.retain(|p| !owned.contains(&p.installment_id));
        self.installments.retain(|i| i.user_id != user_id);
        let outros = self.outros_id();
        self.log_entry(user_id, 0.0, "Parcelamentos zerados", outros, EntryKind::Reset, now);
        true
    }

    fn reset_everything(&mut self, user_id: i64, now: DateTime<Utc>) -> bool {
        let Some(user) = self.user_mut(user_id) else {
            return false;
        };
        user.current_balance = 0.0;
        user.initial_balance = 0.0;
        user.savings_balance = 0.0;
        user.emergency_fund = 0.0;
        user.low_balance_warned = false;

        let owned: Vec<i64> = self
            .installments
            .iter()
            .filter(|i| i.user_id == user_id)
            .map(|i| i.id)
            .collect();
        self.payments.retain(|p| !owned.contains(&p.installment_id));
        self.installments.retain(|i| i.user_id != user_id);
        self.entries.retain(|e| e.user_id != user_id);

        let outros = self.outros_id();
        self.log_entry(user_id, 0.0, "Sistema totalmente zerado", outros, EntryKind::Reset, now);
        true
    }
}
