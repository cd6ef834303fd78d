pub mod message_counts;
