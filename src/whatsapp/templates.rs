// 💬 Message templates - pure functions from a record to message text
//
// Dates are rendered day/month/year with two-digit day and month.

use chrono::NaiveDate;

use crate::entities::{format_brl, Appointment, Invoice};

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn appointment_confirmation(appointment: &Appointment) -> String {
    format!(
        "🏥 *Caramelo Neurodesenvolvimento*\n\n\
         Olá! Confirmando sua consulta:\n\n\
         📅 *Data:* {}\n\
         ⏰ *Horário:* {}\n\
         👩‍⚕️ *Serviço:* {}\n\n\
         Qualquer dúvida, entre em contato conosco!",
        format_date(appointment.date),
        appointment.time_label(),
        appointment.service,
    )
}

pub fn appointment_reminder(appointment: &Appointment) -> String {
    format!(
        "🔔 *Lembrete - Caramelo Neuro*\n\n\
         Sua consulta é amanhã!\n\n\
         📅 {} às {}\n\
         👩‍⚕️ {}\n\n\
         Nos vemos em breve! 😊",
        format_date(appointment.date),
        appointment.time_label(),
        appointment.service,
    )
}

pub fn reschedule_request(appointment: &Appointment) -> String {
    format!(
        "📞 *Solicitação de Reagendamento*\n\n\
         Gostaria de reagendar minha consulta:\n\n\
         📅 Data atual: {}\n\
         ⏰ Horário atual: {}\n\
         👩‍⚕️ Serviço: {}\n\n\
         Por favor, me informe os horários disponíveis. Obrigado!",
        format_date(appointment.date),
        appointment.time_label(),
        appointment.service,
    )
}

pub fn invoice_reminder(invoice: &Invoice) -> String {
    format!(
        "💰 *Lembrete de Pagamento*\n\n\
         Você tem uma fatura pendente:\n\n\
         📋 {}\n\
         💵 Valor: {}\n\
         📅 Vencimento: {}\n\n\
         Para quitar, entre em contato conosco!",
        invoice.description,
        format_brl(invoice.amount),
        format_date(invoice.due_date),
    )
}

pub fn payment_confirmation(invoice: &Invoice) -> String {
    format!(
        "✅ *Pagamento Confirmado*\n\n\
         Recebemos seu pagamento:\n\n\
         📋 {}\n\
         💵 Valor: {}\n\
         📅 Data: {}\n\n\
         Obrigado pela confiança! 🙏",
        invoice.description,
        format_brl(invoice.amount),
        format_date(invoice.date),
    )
}

pub fn welcome_message(client_name: &str) -> String {
    format!(
        "🎉 *Bem-vindo à Caramelo Neuro!*\n\n\
         Olá {}!\n\n\
         Seja bem-vindo(a) à nossa clínica de neurodesenvolvimento. \
         Estamos aqui para cuidar de você com todo carinho e profissionalismo.\n\n\
         📱 Use nosso app para:\n\
         • Ver suas consultas\n\
         • Acompanhar faturas\n\
         • Reagendar atendimentos\n\
         • Receber lembretes\n\n\
         Qualquer dúvida, estamos aqui! 😊",
        client_name,
    )
}

pub fn therapist_notification(message: &str) -> String {
    format!("🏥 *Caramelo Neuro - Sistema*\n\n{}", message)
}

/// Sent by a client who wants to settle a pending invoice
pub fn payment_request(invoice: &Invoice) -> String {
    format!(
        "Gostaria de quitar a fatura: {} - {}",
        invoice.description,
        format_brl(invoice.amount)
    )
}

/// Heads-up before the therapist calls a client
pub fn call_notice(appointment: &Appointment) -> String {
    format!("Olá {}! Ligando para confirmar sua consulta.", appointment.client)
}

pub const HELP_REQUEST: &str = "Olá! Preciso de ajuda com o sistema.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AppointmentStatus, PaymentStatus};
    use chrono::NaiveTime;

    fn appointment() -> Appointment {
        Appointment {
            id: "1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            client: "Maria Silva".to_string(),
            client_id: "1".to_string(),
            service: "Fisioterapia Neurológica".to_string(),
            status: AppointmentStatus::Scheduled,
            price: 120.0,
            notes: None,
            therapist_id: None,
        }
    }

    fn invoice() -> Invoice {
        Invoice {
            id: "2".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            amount: 100.0,
            status: PaymentStatus::Pending,
            description: "Terapia Ocupacional".to_string(),
            client_id: "2".to_string(),
            appointment_id: None,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
        }
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("'{}' not found in message", needle))
    }

    #[test]
    fn test_format_date_pads_day_and_month() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()), "05/03/2024");
    }

    #[test]
    fn test_confirmation_orders_date_time_service() {
        let message = appointment_confirmation(&appointment());

        let date = position(&message, "15/01/2024");
        let time = position(&message, "09:00");
        let service = position(&message, "Fisioterapia Neurológica");

        assert!(date < time);
        assert!(time < service);
        assert!(message.starts_with("🏥 *Caramelo Neurodesenvolvimento*\n\n"));
    }

    #[test]
    fn test_reminder_and_reschedule() {
        let reminder = appointment_reminder(&appointment());
        assert!(reminder.contains("📅 15/01/2024 às 09:00\n"));

        let reschedule = reschedule_request(&appointment());
        assert!(reschedule.contains("Data atual: 15/01/2024"));
        assert!(reschedule.contains("Horário atual: 09:00"));
        assert!(reschedule.ends_with("Por favor, me informe os horários disponíveis. Obrigado!"));
    }

    #[test]
    fn test_invoice_templates_use_two_decimals() {
        let reminder = invoice_reminder(&invoice());
        assert!(reminder.contains("💵 Valor: R$ 100.00"));
        assert!(reminder.contains("Vencimento: 20/01/2024"));

        let paid = payment_confirmation(&invoice());
        assert!(paid.contains("📅 Data: 05/01/2024"));
    }

    #[test]
    fn test_short_messages() {
        assert_eq!(
            payment_request(&invoice()),
            "Gostaria de quitar a fatura: Terapia Ocupacional - R$ 100.00"
        );
        assert_eq!(
            call_notice(&appointment()),
            "Olá Maria Silva! Ligando para confirmar sua consulta."
        );
        assert_eq!(
            therapist_notification("Agenda atualizada"),
            "🏥 *Caramelo Neuro - Sistema*\n\nAgenda atualizada"
        );
        assert!(welcome_message("Ana").contains("Olá Ana!\n\n"));
    }
}
