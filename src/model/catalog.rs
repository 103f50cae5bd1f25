// File: ./src/model/catalog.rs
// Static task catalogs shared by every event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketingTask {
    pub id: &'static str,
    pub label: &'static str,
    /// Optional tasks never count towards the completion percentage.
    pub optional: bool,
    /// Display hint only.
    pub special: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanningTask {
    pub id: &'static str,
    pub label: &'static str,
}

const fn task(id: &'static str, label: &'static str) -> MarketingTask {
    MarketingTask {
        id,
        label,
        optional: false,
        special: false,
    }
}

pub static MARKETING_TASKS: [MarketingTask; 18] = [
    task("press-release", "Create Press Release"),
    task("flyer", "Create Flyer"),
    task("website", "Make Event Page on Website"),
    task("email", "Send Email Blast"),
    MarketingTask {
        id: "yubanet",
        label: "YubaNet (Press Release Only - if worthy)",
        optional: true,
        special: true,
    },
    task("go-nv", "Go Nevada County Calendar"),
    task("arts", "Arts Council Calendar"),
    MarketingTask {
        id: "chamber",
        label: "Grass Valley Chamber Newsletter (2 weeks prior)",
        optional: false,
        special: true,
    },
    task("kvmr", "KVMR Calendar"),
    task("fb-event", "Facebook Event Page"),
    task("fb-nsh", "NSH Facebook Page"),
    task("ig-nsh", "NSH Instagram Page"),
    task("nv-peeps", "Nevada County Peeps"),
    task("gv-peeps", "Grass Valley Peeps"),
    MarketingTask {
        id: "lake-wildwood",
        label: "Lake Wildwood Page",
        optional: true,
        special: false,
    },
    task("nextdoor", "NextDoor"),
    task("union-cal", "Union Event Calendar"),
    MarketingTask {
        id: "union-ad",
        label: "Union Advertisement ($270 - rare)",
        optional: true,
        special: true,
    },
];

pub static PLANNING_TASKS: [PlanningTask; 13] = [
    PlanningTask { id: "venue-booked", label: "Venue Room Booked" },
    PlanningTask { id: "contract-signed", label: "Contract / Agreement Signed" },
    PlanningTask { id: "av-needs", label: "A/V Needs" },
    PlanningTask { id: "seating-layout", label: "Seating Layout" },
    PlanningTask { id: "catering", label: "Catering" },
    PlanningTask { id: "bar-service", label: "Bar Service" },
    PlanningTask { id: "volunteers-scheduled", label: "Volunteers Scheduled" },
    PlanningTask { id: "signage", label: "Signage" },
    PlanningTask { id: "parking", label: "Parking Plan" },
    PlanningTask { id: "insurance", label: "Insurance / Permits" },
    PlanningTask { id: "ticketing", label: "Ticketing Set Up" },
    PlanningTask { id: "cleanup-crew", label: "Cleanup Crew" },
    PlanningTask { id: "day-of-timeline", label: "Day-of Timeline" },
];

pub fn marketing_task(id: &str) -> Option<&'static MarketingTask> {
    MARKETING_TASKS.iter().find(|t| t.id == id)
}

pub fn planning_task(id: &str) -> Option<&'static PlanningTask> {
    PLANNING_TASKS.iter().find(|t| t.id == id)
}

pub fn required_marketing_tasks() -> impl Iterator<Item = &'static MarketingTask> {
    MARKETING_TASKS.iter().filter(|t| !t.optional)
}
