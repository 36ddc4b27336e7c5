//! Outbound document delivery
//!
//! Sending a document has two halves: the status transition (persisted by
//! the repositories) and the outbound email with a rendered PDF. The two are
//! deliberately decoupled: a delivery failure is logged and reported in the
//! response but never rolls back the status change, so a flaky mail server
//! cannot wedge a document in `draft`.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use domain_billing::{Invoice, Payment, Quotation};

/// Delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to render document: {0}")]
    RenderFailed(String),
    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

/// Renders a document into an attachable PDF
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render_quotation(&self, quotation: &Quotation) -> Result<Vec<u8>, NotifyError>;
    async fn render_invoice(&self, invoice: &Invoice) -> Result<Vec<u8>, NotifyError>;
    async fn render_receipt(
        &self,
        invoice: &Invoice,
        payment: &Payment,
    ) -> Result<Vec<u8>, NotifyError>;
}

/// Delivers a rendered document to the client's contact email
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        attachment: Vec<u8>,
    ) -> Result<(), NotifyError>;
}

/// Combined delivery port used by the send handlers
#[async_trait]
pub trait DocumentNotifier: Send + Sync {
    /// Emails a quotation to its contact; returns whether delivery succeeded
    async fn notify_quotation(&self, quotation: &Quotation) -> bool;
    /// Emails an invoice to its contact; returns whether delivery succeeded
    async fn notify_invoice(&self, invoice: &Invoice) -> bool;
    /// Emails a payment receipt to the invoice's contact
    async fn notify_receipt(&self, invoice: &Invoice, payment: &Payment) -> bool;
}

/// Default notifier wiring a renderer and a sender together.
///
/// Failures are logged at WARN and swallowed; the caller only learns the
/// boolean outcome.
pub struct MailNotifier<R, S> {
    renderer: R,
    sender: S,
}

impl<R: PdfRenderer, S: EmailSender> MailNotifier<R, S> {
    pub fn new(renderer: R, sender: S) -> Self {
        Self { renderer, sender }
    }
}

#[async_trait]
impl<R: PdfRenderer, S: EmailSender> DocumentNotifier for MailNotifier<R, S> {
    async fn notify_quotation(&self, quotation: &Quotation) -> bool {
        let result = async {
            let pdf = self.renderer.render_quotation(quotation).await?;
            let subject = format!("Quotation {}", quotation.quotation_number);
            self.sender.send(&quotation.contact.email, &subject, pdf).await
        }
        .await;

        match result {
            Ok(()) => {
                info!(number = %quotation.quotation_number, "Quotation emailed");
                true
            }
            Err(e) => {
                warn!(
                    number = %quotation.quotation_number,
                    error = %e,
                    "Quotation delivery failed; status change stands"
                );
                false
            }
        }
    }

    async fn notify_invoice(&self, invoice: &Invoice) -> bool {
        let result = async {
            let pdf = self.renderer.render_invoice(invoice).await?;
            let subject = format!("Invoice {}", invoice.invoice_number);
            self.sender.send(&invoice.contact.email, &subject, pdf).await
        }
        .await;

        match result {
            Ok(()) => {
                info!(number = %invoice.invoice_number, "Invoice emailed");
                true
            }
            Err(e) => {
                warn!(
                    number = %invoice.invoice_number,
                    error = %e,
                    "Invoice delivery failed; status change stands"
                );
                false
            }
        }
    }

    async fn notify_receipt(&self, invoice: &Invoice, payment: &Payment) -> bool {
        let result = async {
            let pdf = self.renderer.render_receipt(invoice, payment).await?;
            let subject = format!("Payment receipt {}", payment.payment_number);
            self.sender.send(&invoice.contact.email, &subject, pdf).await
        }
        .await;

        match result {
            Ok(()) => {
                info!(number = %payment.payment_number, "Receipt emailed");
                true
            }
            Err(e) => {
                warn!(
                    number = %payment.payment_number,
                    error = %e,
                    "Receipt delivery failed; payment stands"
                );
                false
            }
        }
    }
}

/// Notifier that only logs, for deployments without an SMTP relay
pub struct LogOnlyNotifier;

#[async_trait]
impl DocumentNotifier for LogOnlyNotifier {
    async fn notify_quotation(&self, quotation: &Quotation) -> bool {
        info!(
            number = %quotation.quotation_number,
            recipient = %quotation.contact.email,
            "Quotation send requested (delivery disabled)"
        );
        true
    }

    async fn notify_invoice(&self, invoice: &Invoice) -> bool {
        info!(
            number = %invoice.invoice_number,
            recipient = %invoice.contact.email,
            "Invoice send requested (delivery disabled)"
        );
        true
    }

    async fn notify_receipt(&self, invoice: &Invoice, payment: &Payment) -> bool {
        info!(
            number = %payment.payment_number,
            recipient = %invoice.contact.email,
            "Receipt send requested (delivery disabled)"
        );
        true
    }
}
