mod admin;
mod debug;
mod pages;
mod unsubscribe;
