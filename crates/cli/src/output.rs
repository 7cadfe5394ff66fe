//! Terminal output.
//!
//! Command results go to stdout; notifications and failures go to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use vitrine_core::CheckoutAddress;
use vitrine_storefront::AppError;
use vitrine_storefront::api::{LookbookPhoto, Product};
use vitrine_storefront::cart::CartState;
use vitrine_storefront::checkout::{
    CheckoutError, OrderConfirmation, OrderSummary, ShippingQuote,
};
use vitrine_storefront::notify::{Notifier, Toast, ToastLevel};
use vitrine_storefront::pagination::Page;
use vitrine_storefront::session::Session;

/// Prints toasts to stderr.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: Toast) {
        let marker = match toast.level {
            ToastLevel::Success => "✔",
            ToastLevel::Info => "ℹ",
            ToastLevel::Warning => "!",
            ToastLevel::Error => "✖",
        };
        eprintln!("{marker} {}", toast.message);
    }
}

/// Report a failed command. API failures were already shown as toasts.
pub fn failure(err: &AppError) {
    if !matches!(
        err,
        AppError::Api(_) | AppError::Checkout(CheckoutError::Gateway(_))
    ) {
        eprintln!("✖ {err}");
    }
}

pub fn message(text: &str) {
    println!("{text}");
}

pub fn cart(cart: &CartState) {
    if cart.is_empty() {
        println!("Seu carrinho está vazio");
        return;
    }

    for line in cart.items() {
        println!(
            "{:<12} {:<3} {:>3} x {:>12} = {:>12}  {}",
            line.id,
            line.size,
            line.quantity,
            line.price,
            line.line_total(),
            line.name
        );
    }
    println!("{} itens, total {}", cart.item_count(), cart.total());
}

pub fn products(page: &Page<Product>) {
    for product in &page.items {
        product_row(product);
    }
    println!(
        "Página {} de {} ({} produtos)",
        page.page, page.total_pages, page.total
    );
}

pub fn product_row(product: &Product) {
    println!("{:<12} {:>12}  {}", product.id, product.price, product.name);
}

pub fn product(product: &Product) {
    println!("{}", product.name);
    println!("  ID:       {}", product.id);
    println!("  Preço:    {}", product.price);
    if let Some(category) = &product.category {
        println!("  Categoria: {category}");
    }
    let sizes = if product.sizes.is_empty() {
        "U".to_string()
    } else {
        product
            .sizes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("  Tamanhos: {sizes}");
    if let Some(description) = &product.description {
        println!();
        println!("{description}");
    }
}

pub fn lookbook(page: &Page<LookbookPhoto>) {
    for photo in &page.items {
        lookbook_row(photo);
    }
    println!("Página {} de {}", page.page, page.total_pages);
}

pub fn lookbook_row(photo: &LookbookPhoto) {
    println!(
        "{:<12} {}  {}",
        photo.id,
        photo.image_url,
        photo.caption.as_deref().unwrap_or("")
    );
}

pub fn address(address: &CheckoutAddress) {
    println!("{}, {}", address.street, address.number);
    if let Some(complement) = &address.complement {
        println!("{complement}");
    }
    println!("{} - {}/{}", address.neighborhood, address.city, address.state);
    println!("CEP {}", address.cep);
}

pub fn shipping_options(quotes: &[ShippingQuote]) {
    for quote in quotes {
        let (min, max) = quote.delivery_days;
        let cost = if quote.is_free() {
            "Grátis".to_string()
        } else {
            quote.cost.to_string()
        };
        println!(
            "{:<6} {:>12}  {min} a {max} dias úteis",
            quote.method.label(),
            cost
        );
    }
}

pub fn summary(summary: &OrderSummary) {
    println!("Subtotal: {}", summary.subtotal);
    if !summary.discount.is_zero() {
        println!("Desconto: -{}", summary.discount);
    }
    println!("Frete:    {}", summary.shipping);
    println!("Total:    {}", summary.total);
}

pub fn confirmation(confirmation: &OrderConfirmation) {
    println!(
        "Pedido {} realizado! Total {}",
        confirmation.order_id, confirmation.total
    );
}

pub fn session(session: Option<&Session>) {
    match session {
        Some(session) => {
            println!("Perfil:  {}", session.role());
            println!(
                "Expira:  {}",
                session.expires_at().format("%d/%m/%Y %H:%M UTC")
            );
        }
        None => println!("Nenhuma sessão ativa"),
    }
}
