//! Notification type definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    Report,             // New report for moderators to triage
    ReportResolved,     // Your report was handled
    ModerationNotice,   // Moderation action on your content
    ConnectionRequest,  // Someone wants to connect
    ConnectionAccepted, // Your connection request was accepted
    Message,            // New direct message
    Reply,              // Someone replied to your post
    Vote,               // Someone upvoted your post
    AmbassadorAdded,    // You were made an ambassador
}

impl NotificationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Report => "report",
            Self::ReportResolved => "report_resolved",
            Self::ModerationNotice => "moderation_notice",
            Self::ConnectionRequest => "connection_request",
            Self::ConnectionAccepted => "connection_accepted",
            Self::Message => "message",
            Self::Reply => "reply",
            Self::Vote => "vote",
            Self::AmbassadorAdded => "ambassador_added",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "report" => Some(Self::Report),
            "report_resolved" => Some(Self::ReportResolved),
            "moderation_notice" => Some(Self::ModerationNotice),
            "connection_request" => Some(Self::ConnectionRequest),
            "connection_accepted" => Some(Self::ConnectionAccepted),
            "message" => Some(Self::Message),
            "reply" => Some(Self::Reply),
            "vote" => Some(Self::Vote),
            "ambassador_added" => Some(Self::AmbassadorAdded),
            _ => None,
        }
    }
}
