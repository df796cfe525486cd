use std::io::Write;

use chat_stream::{Role, Snapshot};

/// Prints a streaming reply to a terminal, writing only the text that is new
/// since the previous snapshot.
pub struct ReplyPrinter<W: Write> {
    out: W,
    /// Position the reply takes in the conversation for the current turn.
    reply_index: Option<usize>,
    printed: usize,
}

impl<W: Write> ReplyPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, reply_index: None, printed: 0 }
    }

    pub fn render(&mut self, snapshot: &Snapshot) {
        let messages = &snapshot.messages;
        if snapshot.in_flight && messages.last().is_some_and(|m| m.role == Role::User) {
            self.reply_index = Some(messages.len());
        }
        let Some(index) = self.reply_index else {
            return;
        };

        match messages.get(index) {
            Some(reply) if reply.role == Role::Assistant => {
                if let Some(new_text) = reply.content.get(self.printed..) {
                    let _ = self.out.write_all(new_text.as_bytes());
                    let _ = self.out.flush();
                    self.printed = reply.content.len();
                }
            }
            // The partial reply was rolled back.
            _ if self.printed > 0 => {
                let _ = writeln!(self.out, " [discarded]");
                self.printed = 0;
            }
            _ => {}
        }
    }

    /// Ends the current reply and shows the prompt for the next one.
    pub fn finish(&mut self) {
        if self.printed > 0 {
            let _ = writeln!(self.out);
        }
        self.printed = 0;
        self.reply_index = None;
        self.prompt();
    }

    pub fn prompt(&mut self) {
        let _ = write!(self.out, "> ");
        let _ = self.out.flush();
    }
}
