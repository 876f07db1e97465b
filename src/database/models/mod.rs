pub mod ticket;

pub use ticket::{NewTicket, Priority, Ticket, TicketStatus};
