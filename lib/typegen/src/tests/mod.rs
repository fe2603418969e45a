mod fragments;
mod naming;
mod operations;
