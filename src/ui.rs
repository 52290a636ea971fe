use crate::board::{VOTE_LIMIT_REACHED, VOTE_RECORDED, VoteBoard};
use crate::models::{AnimeEntry, Task};

pub const NOTICE_VOTED: &str = "voted";
pub const NOTICE_LIMIT: &str = "limit";

pub fn render_index(catalog: &[AnimeEntry], board: &VoteBoard, notice: Option<&str>) -> String {
    let (message, kind) = notice.and_then(notice_message).unwrap_or(("", ""));
    INDEX_HTML
        .replace("{{VOTES_CAST}}", &board.user.votes_cast.to_string())
        .replace("{{CARDS}}", &render_cards(catalog, board))
        .replace("{{TASKS}}", &render_tasks(&board.tasks))
        .replace("{{NOTICE_TYPE}}", kind)
        .replace("{{NOTICE}}", message)
}

fn notice_message(code: &str) -> Option<(&'static str, &'static str)> {
    match code {
        NOTICE_VOTED => Some((VOTE_RECORDED, "ok")),
        NOTICE_LIMIT => Some((VOTE_LIMIT_REACHED, "error")),
        _ => None,
    }
}

fn render_cards(catalog: &[AnimeEntry], board: &VoteBoard) -> String {
    catalog
        .iter()
        .map(|anime| {
            let id = escape_html(&anime.id);
            let title = escape_html(&anime.title);
            format!(
                r#"
      <article class="card">
        <img src="{img}" alt="{title}" />
        <div class="card-body">
          <h4>{title}</h4>
          <div class="card-votes">Votes: <strong id="votes-{id}">{votes}</strong></div>
        </div>
        <form class="vote-form" method="post" action="/vote/{id}" data-anime-id="{id}">
          <button class="btn-vote" type="submit">Vote</button>
        </form>
      </article>"#,
                img = escape_html(&anime.image_url),
                votes = board.votes_for(&anime.id),
            )
        })
        .collect()
}

fn render_tasks(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|task| {
            let title = escape_html(&task.title);
            if task.done {
                format!(
                    r#"
        <li><span class="task-title done">{title}</span><span class="task-done">Done</span></li>"#
                )
            } else {
                format!(
                    r#"
        <li>
          <span class="task-title">{title}</span>
          <form class="task-form" method="post" action="/tasks/complete" target="_blank">
            <input type="hidden" name="id" value="{id}" />
            <input type="hidden" name="url" value="{url}" />
            <button class="btn-task" type="submit">Do Task</button>
          </form>
        </li>"#,
                    id = task.id,
                    url = escape_html(&task.url),
                )
            }
        })
        .collect()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Anime Fan Vote</title>
  <style>
    :root {
      --bg-1: #312e81;
      --bg-2: #0f172a;
      --ink: #f1f5f9;
      --muted: #94a3b8;
      --accent: #4f46e5;
      --accent-2: #db2777;
      --ok: #4ade80;
      --error: #f87171;
      --card: rgba(51, 65, 85, 0.4);
      --shadow: 0 18px 40px rgba(2, 6, 23, 0.45);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(180deg, var(--bg-1), var(--bg-2));
      color: var(--ink);
      font-family: system-ui, "Segoe UI", sans-serif;
      padding: 24px;
    }

    .app {
      max-width: 1100px;
      margin: 0 auto;
    }

    header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      margin-bottom: 24px;
    }

    h1 {
      margin: 0;
      font-size: 2.25rem;
      font-weight: 800;
    }

    .layout {
      display: grid;
      grid-template-columns: 2fr 1fr;
      gap: 24px;
      align-items: start;
    }

    .cards {
      display: grid;
      gap: 24px;
    }

    .card {
      display: flex;
      align-items: center;
      gap: 24px;
      padding: 16px;
      border-radius: 16px;
      background: var(--card);
      box-shadow: var(--shadow);
      transition: transform 150ms ease;
      animation: rise 400ms ease;
    }

    .card:hover {
      transform: scale(1.02);
    }

    .card img {
      width: 112px;
      height: 112px;
      border-radius: 10px;
      object-fit: cover;
    }

    .card-body {
      flex: 1;
    }

    .card-body h4 {
      margin: 0 0 6px;
      font-size: 1.25rem;
    }

    .card-votes {
      color: var(--muted);
      font-size: 0.9rem;
    }

    button {
      appearance: none;
      border: none;
      color: white;
      cursor: pointer;
      font-weight: 600;
    }

    .btn-vote {
      background: var(--accent);
      border-radius: 10px;
      padding: 10px 16px;
    }

    .btn-task {
      background: var(--accent-2);
      border-radius: 6px;
      padding: 4px 8px;
      font-size: 0.75rem;
    }

    aside {
      padding: 16px;
      border-radius: 16px;
      background: var(--card);
      box-shadow: var(--shadow);
    }

    aside h3 {
      margin: 0 0 12px;
    }

    #task-list {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 12px;
      font-size: 0.9rem;
    }

    #task-list li {
      display: flex;
      align-items: center;
      justify-content: space-between;
    }

    #task-list form {
      margin: 0;
    }

    .task-title.done {
      text-decoration: line-through;
      color: var(--muted);
    }

    .task-done {
      color: var(--ok);
    }

    .status {
      min-height: 1.2em;
      margin-bottom: 16px;
      color: var(--muted);
    }

    .status[data-type="error"] {
      color: var(--error);
    }

    .status[data-type="ok"] {
      color: var(--ok);
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(20px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @media (max-width: 760px) {
      .layout {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <div class="app">
    <header>
      <h1>Anime Fan Vote</h1>
      <div>Votes cast: <span id="votes-cast">{{VOTES_CAST}}</span></div>
    </header>

    <div class="status" id="status" data-type="{{NOTICE_TYPE}}">{{NOTICE}}</div>

    <main class="layout">
      <section class="cards">{{CARDS}}
      </section>

      <aside>
        <h3>Tasks to unlock extra votes</h3>
        <ul id="task-list">{{TASKS}}
        </ul>
      </aside>
    </main>
  </div>

  <script>
    const statusEl = document.getElementById('status');
    const votesCastEl = document.getElementById('votes-cast');
    const taskListEl = document.getElementById('task-list');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const updateVotes = (votes, user) => {
      document.querySelectorAll('.vote-form').forEach((form) => {
        const id = form.dataset.animeId;
        const el = document.getElementById(`votes-${id}`);
        if (el) {
          el.textContent = votes[id] || 0;
        }
      });
      votesCastEl.textContent = user.votesCast;
    };

    const renderTasks = (tasks) => {
      taskListEl.replaceChildren();
      tasks.forEach((task) => {
        const li = document.createElement('li');
        const title = document.createElement('span');
        title.className = task.done ? 'task-title done' : 'task-title';
        title.textContent = task.title;
        li.appendChild(title);

        if (task.done) {
          const done = document.createElement('span');
          done.className = 'task-done';
          done.textContent = 'Done';
          li.appendChild(done);
        } else {
          const button = document.createElement('button');
          button.className = 'btn-task';
          button.type = 'button';
          button.textContent = 'Do Task';
          button.addEventListener('click', () => {
            completeTask(task.id, task.url).catch((err) => setStatus(err.message, 'error'));
          });
          li.appendChild(button);
        }
        taskListEl.appendChild(li);
      });
    };

    const postJson = async (url, body) => {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    const refresh = async () => {
      const res = await fetch('/api/state');
      if (!res.ok) {
        throw new Error('Unable to load state');
      }
      const state = await res.json();
      updateVotes(state.votes, state.user);
      renderTasks(state.tasks);
    };

    const castVote = async (animeId) => {
      const data = await postJson('/api/vote', { anime_id: animeId });
      updateVotes(data.votes, data.user);
      setStatus(data.message, data.accepted ? 'ok' : 'error');
    };

    const runCommand = (command, win) => {
      if (command.open_url) {
        if (win) {
          win.location = command.open_url;
        } else {
          window.open(command.open_url, '_blank');
        }
      }
    };

    const completeTask = async (id, url) => {
      // opened before the request so popup blockers still see a click
      const win = window.open('', '_blank');
      let data;
      try {
        data = await postJson('/api/tasks/complete', { id, url });
      } catch (err) {
        if (win) {
          win.close();
        }
        throw err;
      }
      runCommand(data.command, win);
      renderTasks(data.tasks);
      votesCastEl.textContent = data.user.votesCast;
      refresh().catch((err) => setStatus(err.message, 'error'));
    };

    document.querySelectorAll('.vote-form').forEach((form) => {
      form.addEventListener('submit', (event) => {
        event.preventDefault();
        castVote(form.dataset.animeId).catch((err) => setStatus(err.message, 'error'));
      });
    });

    document.querySelectorAll('.task-form').forEach((form) => {
      form.addEventListener('submit', (event) => {
        event.preventDefault();
        const id = Number(form.elements.id.value);
        const url = form.elements.url.value;
        completeTask(id, url).catch((err) => setStatus(err.message, 'error'));
      });
    });

    if (window.EventSource) {
      const events = new EventSource('/api/events');
      ['VoteCast', 'TaskCompleted'].forEach((name) => {
        events.addEventListener(name, () => {
          refresh().catch((err) => setStatus(err.message, 'error'));
        });
      });
    }

    if (window.location.search) {
      window.history.replaceState(null, '', '/');
    }
  </script>
</body>
</html>
"#;
