
mod analytics;
mod cashiers;
mod health_check;
mod login;
mod transactions;
