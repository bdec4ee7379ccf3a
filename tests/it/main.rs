mod account;
mod provider;
mod stub;
